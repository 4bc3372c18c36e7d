mod metrics_cache;
mod metrics_record;
mod support;
