use log::debug;

use crate::config::AppConfig;
use crate::structs::*;

/// First record whose code equals `query` exactly.
pub fn find<'a>(records: &'a [Record], query: &str) -> Option<&'a Record> {
    records.iter().find(|record| record.code == query)
}

/// The single status banner.
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Notice>,
    generation: u64,
}

impl Notifier {
    /// Replaces whatever is shown. Errors return the ticket their dismiss timer must carry.
    pub fn show(&mut self, message: &str, severity: Severity) -> Option<DismissTicket> {
        self.generation += 1;
        let ticket = DismissTicket(self.generation);
        self.current = Some(Notice {
            message: message.to_string(),
            severity,
            ticket,
        });
        (severity == Severity::Error).then_some(ticket)
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    /// Hides the notice only if it is still the one `ticket` was issued for.
    pub fn dismiss(&mut self, ticket: DismissTicket) -> bool {
        match self.pending_dismissal() {
            Some(pending) if pending == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending_dismissal(&self) -> Option<DismissTicket> {
        self.current
            .as_ref()
            .filter(|notice| notice.severity == Severity::Error)
            .map(|notice| notice.ticket)
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

/// UI state of the page: search flow, banner and scanner modal.
pub struct Backend {
    config: AppConfig,
    view: ViewState,
    notifier: Notifier,
    scanner: ScannerPhase,
    last_request: u64,
}

impl Backend {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            view: ViewState::Idle,
            notifier: Notifier::default(),
            scanner: ScannerPhase::Closed,
            last_request: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn scanner_phase(&self) -> ScannerPhase {
        self.scanner
    }

    pub fn regions(&self) -> Regions<'_> {
        let result = match &self.view {
            ViewState::ShowingResult(product) => Some(product),
            _ => None,
        };
        Regions {
            result,
            banner: self.notifier.current(),
            scanner_modal: self.scanner != ScannerPhase::Closed,
        }
    }

    pub fn pending_dismissal(&self) -> Option<DismissTicket> {
        self.notifier.pending_dismissal()
    }

    /// Starts a search for `raw`. Blank queries change nothing and return `None`.
    pub fn begin_search(&mut self, raw: &str) -> Option<SearchRequest> {
        let query = raw.trim();
        if query.is_empty() {
            return None;
        }
        self.last_request += 1;
        let id = RequestId(self.last_request);
        debug!("search {:?} for {:?}", id, query);

        self.view = ViewState::Loading(id);
        let loading = self.config.messages.loading.clone();
        self.notifier.show(&loading, Severity::Info);

        Some(SearchRequest {
            id,
            query: query.to_string(),
        })
    }

    pub fn complete_search(
        &mut self,
        request: &SearchRequest,
        fetched: Result<Vec<Record>, LookupError>,
    ) -> SearchOutcome {
        if self.view != ViewState::Loading(request.id) {
            debug!("dropping completion of superseded search {:?}", request.id);
            return SearchOutcome::Superseded;
        }

        let records = match fetched {
            Ok(records) => records,
            Err(err) => {
                self.view = ViewState::ShowingError;
                self.report(err);
                return SearchOutcome::Failed;
            }
        };

        match find(&records, &request.query) {
            Some(record) => {
                let product = Product::from_record(
                    record,
                    &self.config.number_format,
                    &self.config.messages,
                );
                self.view = ViewState::ShowingResult(product);
                self.notifier.hide();
                SearchOutcome::Found
            }
            None => {
                self.view = ViewState::ShowingError;
                self.report(LookupError::NotFound);
                SearchOutcome::NotFound
            }
        }
    }

    /// Reports an error raised outside the search flow. A search still loading keeps its place.
    pub fn fail(&mut self, err: LookupError) {
        if self.config.messages.for_error(err).is_none() {
            return;
        }
        if !matches!(self.view, ViewState::Loading(_)) {
            self.view = ViewState::ShowingError;
        }
        self.report(err);
    }

    fn report(&mut self, err: LookupError) {
        let Some(message) = self.config.messages.for_error(err).map(str::to_string) else {
            return;
        };
        debug!("reporting {}", err);
        self.notifier.show(&message, Severity::Error);
    }

    /// What the single dismiss timer must do, given the ticket it is armed with.
    pub fn timer_change(&self, armed: Option<DismissTicket>) -> TimerChange {
        match (armed, self.pending_dismissal()) {
            (armed, Some(pending)) if armed != Some(pending) => TimerChange::Arm(pending),
            (Some(_), None) => TimerChange::Cancel,
            _ => TimerChange::Keep,
        }
    }

    pub fn dismiss(&mut self, ticket: DismissTicket) -> bool {
        if !self.notifier.dismiss(ticket) {
            return false;
        }
        if self.view == ViewState::ShowingError {
            self.view = ViewState::Idle;
        }
        true
    }

    pub fn open_scanner(&mut self) -> bool {
        if self.scanner != ScannerPhase::Closed {
            return false;
        }
        self.scanner = ScannerPhase::Opening;
        true
    }

    /// `false` means the modal was closed while the camera was starting.
    pub fn capture_started(&mut self) -> bool {
        if self.scanner != ScannerPhase::Opening {
            return false;
        }
        self.scanner = ScannerPhase::Scanning;
        true
    }

    pub fn begin_close(&mut self) -> bool {
        match self.scanner {
            ScannerPhase::Opening | ScannerPhase::Scanning => {
                self.scanner = ScannerPhase::Closing;
                true
            }
            ScannerPhase::Closed | ScannerPhase::Closing => false,
        }
    }

    pub fn finish_close(&mut self) {
        self.scanner = ScannerPhase::Closed;
    }

    pub fn accepts_decoded(&self) -> bool {
        self.scanner == ScannerPhase::Scanning
    }
}
