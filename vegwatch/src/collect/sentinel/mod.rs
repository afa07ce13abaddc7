pub mod sentinel_collect;
