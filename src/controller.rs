// src/controller.rs
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlInputElement;
use yew::functional::UseForceUpdateHandle;
use yew::{Callback, NodeRef};

use crate::backend::Backend;
use crate::config::AppConfig;
use crate::fetcher::TableFetcher;
use crate::scanner::ScanController;
use crate::structs::{DismissTicket, LookupError, ScannerPhase, TimerChange};

struct DismissTimer {
    ticket: DismissTicket,
    fired: bool,
    _timeout: Timeout,
}

/// Wires page events to the backend, the sheet fetcher and the camera.
/// Built once per page; clones share everything.
#[derive(Clone)]
pub struct Controller {
    config: Rc<AppConfig>,
    backend: Rc<RefCell<Backend>>,
    fetcher: Rc<TableFetcher>,
    scanner: Rc<RefCell<Option<ScanController>>>,
    dismissal: Rc<RefCell<Option<DismissTimer>>>,
    query_input: NodeRef,
    redraw: UseForceUpdateHandle,
}

impl Controller {
    pub fn new(config: AppConfig, query_input: NodeRef, redraw: UseForceUpdateHandle) -> Self {
        Self {
            fetcher: Rc::new(TableFetcher::new(config.sheet.clone())),
            backend: Rc::new(RefCell::new(Backend::new(config.clone()))),
            config: Rc::new(config),
            scanner: Rc::new(RefCell::new(None)),
            dismissal: Rc::new(RefCell::new(None)),
            query_input,
            redraw,
        }
    }

    pub fn backend(&self) -> Ref<'_, Backend> {
        self.backend.borrow()
    }

    pub fn scanner_phase(&self) -> ScannerPhase {
        self.backend.borrow().scanner_phase()
    }

    fn query_field(&self) -> Option<HtmlInputElement> {
        self.query_input.cast::<HtmlInputElement>()
    }

    /// Re-arms the dismiss timer if the pending notice changed, then re-renders.
    fn refresh(&self) {
        let armed = self
            .dismissal
            .borrow()
            .as_ref()
            .filter(|timer| !timer.fired)
            .map(|timer| timer.ticket);
        let change = self.backend.borrow().timer_change(armed);
        match change {
            TimerChange::Keep => {}
            // Replacing the slot drops, and so cancels, the previous timer.
            TimerChange::Cancel => *self.dismissal.borrow_mut() = None,
            TimerChange::Arm(ticket) => {
                let this = self.clone();
                let timeout = Timeout::new(self.config.notice_dismiss_ms, move || {
                    this.expire(ticket);
                });
                *self.dismissal.borrow_mut() = Some(DismissTimer {
                    ticket,
                    fired: false,
                    _timeout: timeout,
                });
            }
        }
        self.redraw.force_update();
    }

    // Runs inside the timeout's own callback, so the timer stays in the slot until
    // the next notice replaces it.
    fn expire(&self, ticket: DismissTicket) {
        if let Some(timer) = self.dismissal.borrow_mut().as_mut() {
            if timer.ticket == ticket {
                timer.fired = true;
            }
        }
        self.backend.borrow_mut().dismiss(ticket);
        self.refresh();
    }

    pub fn perform_search(&self) {
        let raw = self.query_field().map(|input| input.value()).unwrap_or_default();
        let Some(request) = self.backend.borrow_mut().begin_search(&raw) else {
            return;
        };
        self.refresh();

        let this = self.clone();
        spawn_local(async move {
            let fetched = this.fetcher.fetch_table().await;
            let outcome = this.backend.borrow_mut().complete_search(&request, fetched);
            debug!("search {:?} finished: {:?}", request.id, outcome);
            if let Some(input) = this.query_field() {
                input.select();
            }
            this.refresh();
        });
    }

    pub fn open_scanner(&self) {
        if self.backend.borrow_mut().open_scanner() {
            self.refresh();
        }
    }

    /// Starts the camera once the modal is on the page.
    pub fn start_capture(&self) {
        if self.scanner_phase() != ScannerPhase::Opening {
            return;
        }
        let started = {
            let mut scanner = self.scanner.borrow_mut();
            let scanner = scanner.get_or_insert_with(|| {
                let this = self.clone();
                ScanController::new(
                    self.config.scanner.clone(),
                    Callback::from(move |text: String| this.on_decoded(text)),
                )
            });
            scanner.start()
        };

        let this = self.clone();
        spawn_local(async move {
            let outcome = match started {
                Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(()) => {
                    if !this.backend.borrow_mut().capture_started() {
                        debug!("scanner closed while the camera was starting");
                        this.release_camera().await;
                    }
                }
                Err(err) => {
                    warn!("camera failed to start: {:?}", err);
                    this.backend.borrow_mut().fail(LookupError::Camera);
                    this.refresh();
                    this.close_scanner();
                }
            }
        });
    }

    pub fn close_scanner(&self) {
        if !self.backend.borrow_mut().begin_close() {
            return;
        }
        self.refresh();

        let this = self.clone();
        spawn_local(async move {
            this.release_camera().await;
            this.backend.borrow_mut().finish_close();
            this.refresh();
        });
    }

    async fn release_camera(&self) {
        let stop = self.scanner.borrow().as_ref().and_then(ScanController::stop);
        let Some(promise) = stop else {
            return;
        };
        match JsFuture::from(promise).await {
            Ok(_) => {
                if let Some(scanner) = self.scanner.borrow().as_ref() {
                    scanner.clear();
                }
            }
            Err(err) => warn!("camera did not stop cleanly: {:?}", err),
        }
    }

    /// A decoded scan counts as typing the code and pressing search.
    fn on_decoded(&self, text: String) {
        if !self.backend.borrow().accepts_decoded() {
            return;
        }
        debug!("scanned {:?}", text);
        if let Some(input) = self.query_field() {
            input.set_value(&text);
        }
        self.close_scanner();
        self.perform_search();
    }
}
