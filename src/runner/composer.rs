use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::form::RequestForm;
use crate::history::HistoryStore;
use crate::http::{ResponseModel, Transport};
use crate::runner::executor::RequestExecutor;

/// Resets the in-flight flag when a submission ends, even if it is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Form submission with duplicate-submit protection.
pub struct RequestComposer<T> {
    executor: RequestExecutor<T>,
    in_flight: AtomicBool,
    last_response: Mutex<Option<ResponseModel>>,
}

impl<T: Transport> RequestComposer<T> {
    pub fn new(executor: RequestExecutor<T>) -> Self {
        Self {
            executor,
            in_flight: AtomicBool::new(false),
            last_response: Mutex::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Build and execute the form's request.
    ///
    /// Returns `None` without doing anything while another submission is in
    /// flight.
    pub async fn submit(&self, form: &RequestForm) -> Option<ResponseModel> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Submission ignored, a request is already in flight");
            return None;
        }
        let _guard = InFlight(&self.in_flight);
        self.set_last_response(None);

        let response = self.executor.execute(form.to_descriptor()).await;
        self.set_last_response(Some(response.clone()));
        Some(response)
    }

    fn set_last_response(&self, response: Option<ResponseModel>) {
        *self
            .last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = response;
    }

    pub fn last_response(&self) -> Option<ResponseModel> {
        self.last_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.executor.history()
    }

    pub fn clear_history(&self) {
        self.executor.history().clear();
    }
}
