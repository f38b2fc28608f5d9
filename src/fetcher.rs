// src/fetcher.rs
//
// JSONP bridge to the gviz endpoint. Each call registers a uniquely named handler on
// `window`, injects a script tag pointing at the endpoint and awaits whichever of the
// handler or the script's `onerror` fires first.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use gloo::utils::{body, document, window};
use js_sys::{Date, Reflect};
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, HtmlScriptElement};

use crate::config::SheetSource;
use crate::parser::{callback_name, records_from_response, GvizResponse};
use crate::structs::{LookupError, Record};

type Reply = Result<JsValue, LookupError>;
type ReplySlot = Rc<RefCell<Option<oneshot::Sender<Reply>>>>;

thread_local! {
    static NEXT_SEQ: Cell<u64> = Cell::new(0);
}

fn next_handler_name() -> String {
    let seq = NEXT_SEQ.with(|seq| {
        let next = seq.get();
        seq.set(next + 1);
        next
    });
    callback_name(Date::now() as u64, seq)
}

fn reply(slot: &ReplySlot, value: Reply) {
    if let Some(tx) = slot.borrow_mut().take() {
        let _ = tx.send(value);
    }
}

/// One in-flight request. Dropping it unregisters the handler and removes the script,
/// whichever way the request ended.
struct PendingRequest {
    handler_name: String,
    script: HtmlScriptElement,
    _on_response: Closure<dyn FnMut(JsValue)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        let key = JsValue::from_str(&self.handler_name);
        if let Err(err) = Reflect::delete_property::<JsValue>(window().unchecked_ref(), &key) {
            warn!("could not unregister {}: {:?}", self.handler_name, err);
        }
        self.script.remove();
    }
}

pub struct TableFetcher {
    source: SheetSource,
}

impl TableFetcher {
    pub fn new(source: SheetSource) -> Self {
        Self { source }
    }

    fn send(&self, handler_name: &str, slot: &ReplySlot) -> Result<PendingRequest, LookupError> {
        let on_response = {
            let slot = slot.clone();
            Closure::wrap(Box::new(move |payload: JsValue| {
                reply(&slot, Ok(payload));
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_error = {
            let slot = slot.clone();
            Closure::wrap(Box::new(move |_e: Event| {
                reply(&slot, Err(LookupError::FetchConnection));
            }) as Box<dyn FnMut(Event)>)
        };

        let script: HtmlScriptElement = document()
            .create_element("script")
            .map_err(|err| {
                warn!("could not create script element: {:?}", err);
                LookupError::FetchConnection
            })?
            .unchecked_into();
        script.set_id(handler_name);
        script.set_src(&self.source.request_url(handler_name));
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        // Built before anything touches the page so every exit below cleans up.
        let request = PendingRequest {
            handler_name: handler_name.to_string(),
            script,
            _on_response: on_response,
            _on_error: on_error,
        };

        Reflect::set(
            &window(),
            &JsValue::from_str(handler_name),
            request._on_response.as_ref(),
        )
        .map_err(|err| {
            warn!("could not register {}: {:?}", handler_name, err);
            LookupError::FetchConnection
        })?;
        body().append_child(&request.script).map_err(|err| {
            warn!("could not inject {}: {:?}", handler_name, err);
            LookupError::FetchConnection
        })?;
        Ok(request)
    }

    /// Fetches a fresh snapshot of the sheet. No caching, no retry, no timeout.
    pub async fn fetch_table(&self) -> Result<Vec<Record>, LookupError> {
        let handler_name = next_handler_name();
        let (tx, rx) = oneshot::channel::<Reply>();
        let slot: ReplySlot = Rc::new(RefCell::new(Some(tx)));

        let request = self.send(&handler_name, &slot)?;
        debug!("waiting on {}", handler_name);
        let reply = rx.await.unwrap_or(Err(LookupError::FetchConnection));
        drop(request);

        let payload = reply.map_err(|err| {
            warn!("{} failed: {}", handler_name, err);
            err
        })?;
        let response: Option<GvizResponse> =
            serde_wasm_bindgen::from_value(payload).map_err(|err| {
                warn!("{} returned an unreadable payload: {}", handler_name, err);
                LookupError::FetchFormat
            })?;
        records_from_response(response)
    }
}
