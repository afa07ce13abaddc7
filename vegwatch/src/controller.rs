use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::collect::client::{AnalysisClient, RequestLifecycleState, SubmissionOutcome};
use crate::collect::request::{AnalysisRequest, IndexChoice, RequestBuilder};
use crate::collect::sentinel::sentinel_collect::AnalysisService;
use crate::commons::date_range::DateRangeInput;
use crate::config::AnalysisConfig;
use crate::error::ValidationError;
use crate::geometric::area_of_interest::GeometryInput;
use crate::presenter::{PresentationModel, ResultPresenter};

/// Receives a fresh presentation on every lifecycle transition.
///
/// Rendering happens while the lifecycle is locked, so a sink must not call
/// back into its controller.
pub trait PresentationSink: Send + Sync {
    fn render(&self, model: &PresentationModel);
}

impl<F> PresentationSink for F
where
    F: Fn(&PresentationModel) + Send + Sync,
{
    fn render(&self, model: &PresentationModel) {
        self(model)
    }
}

/// Composition root of the analysis form
///
/// Owns the form inputs and the lifecycle client. Hidden form values
/// (input mode, fixed field size, vegetation index) come from the
/// configuration it is built with.
pub struct AnalysisController<S> {
    geometry: GeometryInput,
    dates: DateRangeInput,
    index_choice: IndexChoice,
    presenter: ResultPresenter,
    client: AnalysisClient<S>,
    last_rejection: Mutex<Option<ValidationError>>,
}

impl<S: AnalysisService> AnalysisController<S> {
    pub fn new(service: S, config: &AnalysisConfig) -> Self {
        AnalysisController {
            geometry: GeometryInput::new(config.form.input_mode, config.form.fixed_field_size),
            dates: DateRangeInput::default(),
            index_choice: config.form.index,
            presenter: ResultPresenter::new(config.service.image_media_type.clone()),
            client: AnalysisClient::new(service),
            last_rejection: Mutex::new(None),
        }
    }

    /// Render through `sink` on every lifecycle transition
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        let presenter = self.presenter.clone();
        self.client.set_observer(Arc::new(move |state: &RequestLifecycleState| {
            sink.render(&presenter.present(state));
        }));
        self
    }

    pub fn geometry(&self) -> &GeometryInput {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut GeometryInput {
        &mut self.geometry
    }

    pub fn dates_mut(&mut self) -> &mut DateRangeInput {
        &mut self.dates
    }

    pub fn client(&self) -> &AnalysisClient<S> {
        &self.client
    }

    /// Validate the current form values and build the request
    pub fn build_request(&self) -> Result<AnalysisRequest, ValidationError> {
        let area_of_interest = self.geometry.validate()?;
        let date_range = self.dates.validate()?;
        Ok(RequestBuilder::build(
            area_of_interest,
            date_range,
            self.index_choice,
        ))
    }

    /// Handle a submit event.
    ///
    /// A validation failure aborts before any network call, leaves the
    /// lifecycle untouched and is kept as [`Self::last_rejection`].
    pub async fn submit(&self) -> Result<SubmissionOutcome, ValidationError> {
        let request = match self.build_request() {
            Ok(request) => {
                *self.last_rejection.lock() = None;
                request
            }
            Err(err) => {
                info!("Submission rejected: {}", err);
                *self.last_rejection.lock() = Some(err.clone());
                return Err(err);
            }
        };

        if self.client.state().is_submitting() {
            debug!("Superseding the submission in flight");
        }
        debug!("Submitting {:?}", request.body());
        Ok(self.client.submit(request).await)
    }

    /// Reason of the most recent rejected submission, if it was not
    /// followed by an accepted one
    pub fn last_rejection(&self) -> Option<ValidationError> {
        self.last_rejection.lock().clone()
    }

    /// Presentation of the current lifecycle state
    pub fn presentation(&self) -> PresentationModel {
        self.presenter.present(&self.client.state())
    }
}
