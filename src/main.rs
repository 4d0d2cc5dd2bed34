//! Pledge entry point
//!
//! Wires the DOM to the controller on the web and runs a scripted
//! walkthrough natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{Document, HtmlInputElement};

    use pledge::celebration::Confetti;
    use pledge::certificate::{SharePayload, download_filename};
    use pledge::error::{ExternalError, StorageError};
    use pledge::flow::{DecisionControls, Draft, Gender, NameField, Screen};
    use pledge::notify::{Notification, ShareOutcome, export_notification, share_notification};
    use pledge::persistence::{KeyValueStore, LocalStore, MemoryStore};
    use pledge::{Controller, Effect, Event, Settings};

    // Optional third-party providers loaded by index.html
    #[wasm_bindgen(inline_js = "
        export function fire_confetti(options) {
            if (typeof window.confetti !== 'function') {
                return false;
            }
            window.confetti(options);
            return true;
        }

        export function export_certificate(elementId, filename) {
            if (typeof window.html2canvas !== 'function') {
                return Promise.reject('unavailable');
            }
            const el = document.getElementById(elementId);
            return window.html2canvas(el).then(canvas => {
                const link = document.createElement('a');
                link.download = filename;
                link.href = canvas.toDataURL('image/png');
                link.click();
            });
        }

        export function share_certificate(title, text, url) {
            if (navigator.share) {
                return navigator.share({ title, text, url }).then(() => 'shared');
            }
            if (navigator.clipboard) {
                return navigator.clipboard.writeText(url).then(() => 'copied');
            }
            return Promise.reject('unavailable');
        }
    ")]
    extern "C" {
        fn fire_confetti(options: &JsValue) -> bool;
        fn export_certificate(element_id: &str, filename: &str) -> js_sys::Promise;
        fn share_certificate(title: &str, text: &str, url: &str) -> js_sys::Promise;
    }

    /// LocalStorage when the browser allows it, memory otherwise
    enum Backend {
        Local(LocalStore),
        Memory(MemoryStore),
    }

    impl KeyValueStore for Backend {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            match self {
                Backend::Local(s) => s.get_item(key),
                Backend::Memory(s) => s.get_item(key),
            }
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            match self {
                Backend::Local(s) => s.set_item(key, value),
                Backend::Memory(s) => s.set_item(key, value),
            }
        }

        fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
            match self {
                Backend::Local(s) => s.remove_item(key),
                Backend::Memory(s) => s.remove_item(key),
            }
        }
    }

    /// App instance holding all state
    struct App {
        controller: Controller<Backend>,
        /// Latest notification, so older dismiss timers leave it alone
        notification_seq: u32,
    }

    type Shared = Rc<RefCell<App>>;

    fn today() -> chrono::NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn input(document: &Document, id: &str) -> Option<HtmlInputElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn input_value(id: &str) -> String {
        document()
            .and_then(|d| input(&d, id))
            .map(|i| i.value())
            .unwrap_or_default()
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_timeout(after: Duration, f: impl FnOnce() + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(f);
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            after.as_millis() as i32,
        );
        closure.forget();
    }

    /// Map a rejected provider promise to an error
    fn classify(err: JsValue, provider: &'static str) -> ExternalError {
        if err.as_string().as_deref() == Some("unavailable") {
            return ExternalError::Unavailable(provider);
        }
        let name = js_sys::Reflect::get(&err, &JsValue::from_str("name"))
            .ok()
            .and_then(|n| n.as_string());
        match name.as_deref() {
            Some("AbortError") => ExternalError::Cancelled,
            _ => ExternalError::Rejected(format!("{:?}", err)),
        }
    }

    fn dispatch(app: &Shared, event: Event) {
        let effects = app.borrow_mut().controller.dispatch(event, today());
        render(app, effects);
    }

    fn render(app: &Shared, effects: Vec<Effect>) {
        let Some(document) = document() else {
            return;
        };

        for effect in effects {
            match effect {
                Effect::Show(screen) => {
                    for s in Screen::ALL {
                        set_hidden(&document, s.element_id(), s != screen);
                    }
                }
                Effect::FieldStatus { field, error } => {
                    let message = error.map(|e| e.message()).unwrap_or("");
                    set_text(&document, field.error_id(), message);
                    if let Some(el) = document.get_element_by_id(field.input_id()) {
                        let _ = el.class_list().toggle_with_force("invalid", error.is_some());
                    }
                }
                Effect::Prefill(draft) => prefill(&document, &draft),
                Effect::Controls(controls) => apply_controls(&document, controls),
                Effect::GenderSelected(gender) => {
                    for g in [Gender::Male, Gender::Female] {
                        if let Some(radio) = input(&document, &format!("gender-{}", g.as_str())) {
                            radio.set_checked(gender == g);
                        }
                    }
                }
                Effect::Schedule { after, event } => {
                    let app = app.clone();
                    set_timeout(after, move || dispatch(&app, event));
                }
                Effect::Celebrate => {
                    let seed = js_sys::Date::now() as u64;
                    run_confetti(Confetti::new(seed), js_sys::Date::now());
                }
                Effect::Certificate(certificate) => {
                    set_text(&document, "certificate-name", &certificate.full_name);
                    set_text(&document, "certificate-date", &certificate.issued_on);
                }
                Effect::PromptRestart => {
                    let confirmed = web_sys::window()
                        .and_then(|w| {
                            w.confirm_with_message("Start over? Your certificate will be cleared.")
                                .ok()
                        })
                        .unwrap_or(false);
                    let event = if confirmed {
                        Event::ConfirmRestart
                    } else {
                        Event::CancelRestart
                    };
                    dispatch(app, event);
                }
                // Storage effects are consumed by the controller
                Effect::Persist(_) | Effect::PersistDraft(_) | Effect::ClearPersisted => {}
            }
        }
    }

    fn prefill(document: &Document, draft: &Draft) {
        for field in [NameField::First, NameField::Last] {
            if let Some(el) = input(document, field.input_id()) {
                el.set_value(draft.field(field));
            }
        }
    }

    fn apply_controls(document: &Document, controls: DecisionControls) {
        for id in ["yes-btn", "no-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let _ = btn.toggle_attribute_with_force("disabled", !controls.enabled);
            }
        }
        set_hidden(document, "decline-prompt", !controls.decline_prompt);
        set_hidden(document, "loading", !controls.loading);
    }

    fn run_confetti(mut confetti: Confetti, started: f64) {
        let elapsed = Duration::from_millis((js_sys::Date::now() - started).max(0.0) as u64);
        let Some(bursts) = confetti.frame(elapsed) else {
            return;
        };
        for burst in bursts {
            let options = serde_json::to_string(&burst)
                .ok()
                .and_then(|json| js_sys::JSON::parse(&json).ok());
            let Some(options) = options else {
                return;
            };
            if !fire_confetti(&options) {
                log::info!("Confetti provider not loaded, skipping celebration");
                return;
            }
        }
        let interval = confetti.interval();
        set_timeout(interval, move || run_confetti(confetti, started));
    }

    fn show_notification(app: &Shared, notification: Notification) {
        let Some(document) = document() else {
            return;
        };
        let seq = {
            let mut a = app.borrow_mut();
            a.notification_seq = a.notification_seq.wrapping_add(1);
            a.notification_seq
        };
        if let Some(el) = document.get_element_by_id("notification") {
            el.set_text_content(Some(&notification.message));
            el.set_class_name(&format!("notification {}", notification.severity.as_str()));
        }
        let app = app.clone();
        set_timeout(notification.ttl, move || {
            if app.borrow().notification_seq != seq {
                return;
            }
            if let Some(document) = document() {
                set_hidden(&document, "notification", true);
            }
        });
    }

    /// Settings-adjusted notification for results produced outside the controller
    fn notify_external(app: &Shared, notification: Option<Notification>) {
        if let Some(n) = notification {
            let ttl = app.borrow().controller.settings().notification_ttl();
            show_notification(app, n.with_ttl(ttl));
        }
    }

    fn download(app: Shared) {
        let filename = download_filename(&app.borrow().controller.state().record);
        spawn_local(async move {
            let outcome = match JsFuture::from(export_certificate("certificate", &filename)).await {
                Ok(_) => Ok(filename),
                Err(e) => Err(classify(e, "image export")),
            };
            notify_external(&app, export_notification(outcome));
        });
    }

    fn share(app: Shared) {
        let url = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        let payload = SharePayload::new(&app.borrow().controller.state().record, &url);
        spawn_local(async move {
            let promise = share_certificate(&payload.title, &payload.text, &payload.url);
            let outcome = match JsFuture::from(promise).await {
                Ok(v) if v.as_string().as_deref() == Some("copied") => Ok(ShareOutcome::CopiedLink),
                Ok(_) => Ok(ShareOutcome::Shared),
                Err(e) => Err(classify(e, "sharing")),
            };
            notify_external(&app, share_notification(outcome));
        });
    }

    /// Attach `handler` to `kind` events on element `id`
    fn on<F>(document: &Document, id: &str, kind: &str, handler: F)
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        let _ = el.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_entry_form(document: &Document, app: &Shared) {
        {
            let app = app.clone();
            on(document, "entry-form", "submit", move |event| {
                event.prevent_default();
                dispatch(
                    &app,
                    Event::Submit {
                        first_name: input_value(NameField::First.input_id()),
                        last_name: input_value(NameField::Last.input_id()),
                    },
                );
            });
        }

        for field in [NameField::First, NameField::Last] {
            let app = app.clone();
            on(document, field.input_id(), "input", move |_event| {
                let value = input_value(field.input_id());
                dispatch(&app, Event::Input { field, value });
            });
        }
    }

    fn setup_decision(document: &Document, app: &Shared) {
        for gender in [Gender::Male, Gender::Female] {
            let app = app.clone();
            on(document, &format!("gender-{}", gender.as_str()), "change", move |_event| {
                dispatch(&app, Event::SelectGender(gender));
            });
        }

        let buttons = [
            ("yes-btn", Event::Commit),
            ("no-btn", Event::Decline),
            ("reconsider-btn", Event::Reconsider),
        ];
        for (id, event) in buttons {
            let app = app.clone();
            on(document, id, "click", move |_event| dispatch(&app, event.clone()));
        }
    }

    fn setup_result(document: &Document, app: &Shared) {
        {
            let app = app.clone();
            on(document, "download-btn", "click", move |_event| download(app.clone()));
        }
        {
            let app = app.clone();
            on(document, "share-btn", "click", move |_event| share(app.clone()));
        }
        {
            let app = app.clone();
            on(document, "restart-btn", "click", move |_event| {
                dispatch(&app, Event::RequestRestart)
            });
        }
    }

    /// Browser-level reduced motion preference
    fn prefers_reduced_motion() -> bool {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Pledge starting...");

        let Some(document) = document() else {
            log::error!("No document, cannot start");
            return;
        };

        let backend = match LocalStore::open() {
            Ok(store) => Backend::Local(store),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                Backend::Memory(MemoryStore::new())
            }
        };

        let (mut controller, effects) = Controller::start(backend, today());
        if prefers_reduced_motion() && !controller.settings().reduced_motion {
            log::info!("Reduced motion requested by the browser");
            controller.set_settings(Settings {
                reduced_motion: true,
                ..controller.settings().clone()
            });
        }
        let app = Rc::new(RefCell::new(App {
            controller,
            notification_seq: 0,
        }));

        setup_entry_form(&document, &app);
        setup_decision(&document, &app);
        setup_result(&document, &app);

        set_hidden(&document, "loading", true);
        render(&app, effects);

        log::info!("Pledge running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pledge (native) starting...");
    log::info!("The wizard UI is web-only - run with `trunk serve`; replaying a demo session");

    demo_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Walk through the whole wizard against in-memory storage
#[cfg(not(target_arch = "wasm32"))]
fn demo_session() {
    use pledge::flow::Gender;
    use pledge::persistence::MemoryStore;
    use pledge::runtime::Timeline;
    use pledge::{Controller, Effect, Event};

    let today = chrono::Local::now().date_naive();
    let (mut controller, effects) = Controller::start(MemoryStore::new(), today);
    let mut timeline = Timeline::new();
    log_effects("start", &timeline.absorb(effects));

    let script = [
        Event::Submit {
            first_name: "Jo".into(),
            last_name: "".into(),
        },
        Event::Submit {
            first_name: "Jo".into(),
            last_name: "Smith".into(),
        },
        Event::SelectGender(Gender::Female),
        Event::Decline,
        Event::Reconsider,
        Event::Commit,
    ];
    for event in script {
        let label = format!("{:?}", event);
        let effects = controller.dispatch(event, today);
        log_effects(&label, &timeline.absorb(effects));
    }

    let effects = timeline.advance(pledge::consts::PROCESSING_DELAY, |event| {
        controller.dispatch(event, today)
    });
    log_effects("after processing delay", &effects);

    if let Some(certificate) = &controller.state().certificate {
        log::info!(
            "Certificate: {} on {} ({})",
            certificate.full_name,
            certificate.issued_on,
            pledge::certificate::download_filename(&controller.state().record)
        );
    }

    for event in [Event::RequestRestart, Event::ConfirmRestart] {
        let label = format!("{:?}", event);
        let effects = controller.dispatch(event, today);
        log_effects(&label, &timeline.absorb(effects));
    }

    fn log_effects(label: &str, effects: &[Effect]) {
        log::info!("{} -> {} effect(s)", label, effects.len());
        for effect in effects {
            log::info!("  {:?}", effect);
        }
    }
}
