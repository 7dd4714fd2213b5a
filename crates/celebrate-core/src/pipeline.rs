//! Fixed-order validation pipeline.
//!
//! Steps always run in segment order:
//!
//! ```text
//! headers → params → query → cookies → signedCookies → body
//! ```
//!
//! | Mode | Evaluation | Mutation | Error |
//! |------|-----------|----------|-------|
//! | `Partial` | sequential, stops at the first failure | after each passing step | exactly one segment |
//! | `Full` | every step, polled together | only if every step passed | one entry per failed segment |
//!
//! With `req_context` on, `Partial` hands each step a context taken after the
//! previous steps were applied, so later segments see validated values.
//! `Full` takes the context once, before any step runs, since nothing is
//! applied until every step has passed.

use crate::error::ValidationError;
use crate::options::{Mode, ValidationOptions};
use crate::request::{RequestMutator, SegmentedRequest};
use crate::validator::Step;
use futures_util::future::join_all;
use std::borrow::Cow;

/// Runs steps against a request under one [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pipeline {
    mode: Mode,
    req_context: bool,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(mode: Mode, req_context: bool) -> Self {
        Self { mode, req_context }
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Validates `request` against `steps`, which must be in segment order.
    ///
    /// On success the request carries every normalized value. On failure the
    /// request is left as described in the module documentation.
    pub async fn run<R>(
        &self,
        steps: &[Step],
        request: &mut R,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError>
    where
        R: SegmentedRequest + ?Sized,
    {
        debug_assert!(
            steps.windows(2).all(|w| w[0].segment() < w[1].segment()),
            "pipeline steps must follow segment order"
        );

        match self.mode {
            Mode::Partial => self.run_partial(steps, request, options).await,
            Mode::Full => self.run_full(steps, request, options).await,
        }
    }

    fn effective_options<'o, R>(&self, request: &R, options: &'o ValidationOptions) -> Cow<'o, ValidationOptions>
    where
        R: SegmentedRequest + ?Sized,
    {
        if self.req_context {
            Cow::Owned(options.with_context(request.context()))
        } else {
            Cow::Borrowed(options)
        }
    }

    async fn run_partial<R>(
        &self,
        steps: &[Step],
        request: &mut R,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError>
    where
        R: SegmentedRequest + ?Sized,
    {
        for step in steps {
            let segment = step.segment();
            let opts = self.effective_options(&*request, options);

            let pending = step.run(&*request, &opts);
            match pending.await {
                Ok(value) => {
                    tracing::debug!(segment = %segment, mode = "partial", "segment passed validation");
                    RequestMutator::apply(request, segment, value);
                }
                Err(failure) => {
                    tracing::debug!(
                        segment = %segment,
                        mode = "partial",
                        violations = failure.error.violations().len(),
                        "segment failed validation"
                    );
                    return Err(ValidationError::from_failure(failure));
                }
            }
        }
        Ok(())
    }

    async fn run_full<R>(
        &self,
        steps: &[Step],
        request: &mut R,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError>
    where
        R: SegmentedRequest + ?Sized,
    {
        let opts = self.effective_options(&*request, options);
        let pending: Vec<_> = steps.iter().map(|step| step.run(&*request, &opts)).collect();
        let outcomes = join_all(pending).await;

        let mut error = ValidationError::new();
        let mut updates = Vec::with_capacity(steps.len());

        for (step, outcome) in steps.iter().zip(outcomes) {
            match outcome {
                Ok(value) => updates.push((step.segment(), value)),
                Err(failure) => {
                    tracing::debug!(
                        segment = %failure.segment,
                        mode = "full",
                        violations = failure.error.violations().len(),
                        "segment failed validation"
                    );
                    error.add(failure.segment, failure.error);
                }
            }
        }

        if !error.is_empty() {
            return Err(error);
        }

        for (segment, value) in updates {
            RequestMutator::apply(request, segment, value);
        }
        tracing::debug!(segments = steps.len(), mode = "full", "all segments passed validation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CompiledSchema, FnSchema};
    use crate::error::EngineError;
    use crate::request::PlainRequest;
    use crate::segment::Segment;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Passes objects, adding `"checked": true`; fails anything else.
    fn object_schema(log: Arc<Mutex<Vec<Segment>>>, segment: Segment) -> Arc<dyn CompiledSchema> {
        Arc::new(FnSchema::new(move |value: &Value, _: &ValidationOptions| {
            log.lock().unwrap().push(segment);
            match value {
                Value::Object(map) => {
                    let mut map = map.clone();
                    map.insert("checked".to_string(), Value::Bool(true));
                    Ok(Some(Value::Object(map)))
                }
                _ => Err(EngineError::new(format!("{segment} must be an object"))),
            }
        }))
    }

    fn steps(log: &Arc<Mutex<Vec<Segment>>>, segments: &[Segment]) -> Vec<Step> {
        segments
            .iter()
            .map(|s| Step::new(*s, object_schema(log.clone(), *s)))
            .collect()
    }

    #[tokio::test]
    async fn test_partial_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = steps(&log, &[Segment::Headers, Segment::Query, Segment::Body]);
        let mut req = PlainRequest::new("POST")
            .with(Segment::Headers, json!({}))
            .with(Segment::Query, json!("bad"))
            .with(Segment::Body, json!("bad"));

        let err = Pipeline::new(Mode::Partial, false)
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.segments().collect::<Vec<_>>(), vec![Segment::Query]);
        assert_eq!(*log.lock().unwrap(), vec![Segment::Headers, Segment::Query]);
        // Headers passed before the failure and were applied.
        assert_eq!(req.segment(Segment::Headers), json!({ "checked": true }));
        assert_eq!(req.segment(Segment::Body), json!("bad"));
    }

    #[tokio::test]
    async fn test_full_collects_every_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = steps(&log, &[Segment::Headers, Segment::Query, Segment::Body]);
        let original = PlainRequest::new("POST")
            .with(Segment::Headers, json!({}))
            .with(Segment::Query, json!("bad"))
            .with(Segment::Body, json!("bad"));
        let mut req = original.clone();

        let err = Pipeline::new(Mode::Full, false)
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.segments().collect::<Vec<_>>(), vec![Segment::Query, Segment::Body]);
        assert_eq!(log.lock().unwrap().len(), 3);
        assert_eq!(req, original);
    }

    #[tokio::test]
    async fn test_full_applies_all_on_success() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = steps(&log, &[Segment::Params, Segment::Cookies]);
        let mut req = PlainRequest::new("GET")
            .with(Segment::Params, json!({ "id": 1 }))
            .with(Segment::Cookies, json!({}));

        Pipeline::new(Mode::Full, false)
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap();

        assert_eq!(req.segment(Segment::Params), json!({ "id": 1, "checked": true }));
        assert_eq!(req.segment(Segment::Cookies), json!({ "checked": true }));
    }

    #[tokio::test]
    async fn test_partial_context_sees_validated_values() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let params: Arc<dyn CompiledSchema> = Arc::new(FnSchema::new(|_: &Value, _: &ValidationOptions| {
            Ok(Some(json!({ "userId": 42 })))
        }));
        let body: Arc<dyn CompiledSchema> = Arc::new(FnSchema::new(move |_: &Value, opts: &ValidationOptions| {
            *sink.lock().unwrap() = opts.context.clone();
            Ok(None)
        }));
        let steps = vec![Step::new(Segment::Params, params), Step::new(Segment::Body, body)];
        let mut req = PlainRequest::new("POST")
            .with(Segment::Params, json!({ "userId": "42" }))
            .with(Segment::Body, json!({}));

        Pipeline::new(Mode::Partial, true)
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap();

        let context = seen.lock().unwrap().clone().unwrap();
        assert_eq!(context["params"]["userId"], json!(42));
    }

    #[tokio::test]
    async fn test_full_context_sees_raw_values() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let params: Arc<dyn CompiledSchema> = Arc::new(FnSchema::new(|_: &Value, _: &ValidationOptions| {
            Ok(Some(json!({ "userId": 42 })))
        }));
        let body: Arc<dyn CompiledSchema> = Arc::new(FnSchema::new(move |_: &Value, opts: &ValidationOptions| {
            *sink.lock().unwrap() = opts.context.clone();
            Ok(None)
        }));
        let steps = vec![Step::new(Segment::Params, params), Step::new(Segment::Body, body)];
        let mut req = PlainRequest::new("POST")
            .with(Segment::Params, json!({ "userId": "42" }))
            .with(Segment::Body, json!({}));

        Pipeline::new(Mode::Full, true)
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap();

        let context = seen.lock().unwrap().clone().unwrap();
        assert_eq!(context["params"]["userId"], json!("42"));
        assert_eq!(req.segment(Segment::Params), json!({ "userId": 42 }));
    }

    #[tokio::test]
    async fn test_no_context_without_req_context() {
        let seen = Arc::new(Mutex::new(Some(Value::Null)));
        let sink = seen.clone();
        let body: Arc<dyn CompiledSchema> = Arc::new(FnSchema::new(move |_: &Value, opts: &ValidationOptions| {
            *sink.lock().unwrap() = opts.context.clone();
            Ok(None)
        }));
        let steps = vec![Step::new(Segment::Body, body)];
        let mut req = PlainRequest::new("POST").with(Segment::Body, json!({}));

        Pipeline::default()
            .run(&steps, &mut req, &ValidationOptions::default())
            .await
            .unwrap();

        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_steps_pass() {
        let mut req = PlainRequest::new("GET");
        for mode in [Mode::Partial, Mode::Full] {
            Pipeline::new(mode, false)
                .run(&[], &mut req, &ValidationOptions::default())
                .await
                .unwrap();
        }
    }
}
