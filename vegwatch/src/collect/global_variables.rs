/// Analysis service reached when no configuration says otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8500";

/// Endpoint returning the composite image together with vegetation percentages.
pub const PERCENTAGE_PATH: &str = "/api/sentinel/percentage";

/// Media type the service encodes its composite image with.
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/png";

/// Environment variable overriding the configured service URL.
pub const SERVICE_URL_ENV: &str = "VEGWATCH_SERVICE_URL";
