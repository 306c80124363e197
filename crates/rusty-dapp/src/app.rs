//! Main application state and update loop

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use eframe::egui;
use tracing::{debug, error, info, warn};

use rusty_dapp_signing_core::{
    parse_wallet_callback, Address, BatchStatus, DappStore, JobOutcome, ProviderType,
    ScamPhishingAlert, SigningCoordinator, SigningJob, StepOutcome, StoreAction, StoreEvent,
};

use crate::components::scam_phishing_alert;
use crate::components::sign_modals::{self, ModalAction, ModalView};
use crate::signing_bridge::SigningBridge;
use crate::state::{BatchFormState, LoginFormState, NoticeState, SecurityPanelState};
use crate::ui;

/// The main application state
pub struct App {
    bridge: SigningBridge,
    /// Worker pool for coordinator jobs that hit the network
    runtime: tokio::runtime::Runtime,
    store: DappStore,
    events: Receiver<StoreEvent>,
    coordinator: SigningCoordinator,
    /// Finished jobs, drained every frame
    job_results: Arc<Mutex<Vec<JobOutcome>>>,
    login_form: LoginFormState,
    batch_form: BatchFormState,
    security: SecurityPanelState,
    callback_input: String,
    notice: NoticeState,
    /// Last web-wallet URL handed to the browser
    opened_redirect: Option<String>,
    /// Session ids queued from this window, oldest first
    sessions: Vec<String>,
}

impl App {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        bridge: SigningBridge,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let mut store = DappStore::new(bridge.network().clone());
        let events = store.subscribe();
        let coordinator = SigningCoordinator::new(bridge.coordinator_config());

        Self {
            bridge,
            runtime,
            store,
            events,
            coordinator,
            job_results: Arc::new(Mutex::new(Vec::new())),
            login_form: LoginFormState::default(),
            batch_form: BatchFormState::default(),
            security: SecurityPanelState {
                show_authorization: false,
                duration: "24 hours".to_owned(),
            },
            callback_input: String::new(),
            notice: NoticeState::default(),
            opened_redirect: None,
            sessions: Vec::new(),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.check_job_results();
        self.drain_store_events(ctx);
        self.open_pending_redirect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("🔐 Rusty-Dapp").size(22.0).color(ui::ACCENT));
                ui.add_space(30.0);
                ui.separator();
                ui.add_space(10.0);
                let network = self.store.network();
                ui.label(format!("Network: {} (chain {})", network.id, network.chain_id));
                ui.separator();
                match self.store.provider_type() {
                    Some(provider_type) => ui.label(format!("Signer: {provider_type}")),
                    None => ui.label(egui::RichText::new("No signer").color(ui::WARNING)),
                };
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(10.0);
                self.render_notice(ui);
                self.render_security(ui);
                self.render_login(ui);
                self.render_batch_builder(ui);
                self.render_wallet_callback(ui);
                self.render_sessions(ui);
                ui.add_space(20.0);
            });
        });

        self.render_sign_modal(ctx);
    }
}

impl App {
    fn drain_store_events(&mut self, ctx: &egui::Context) {
        let mut handled = false;
        while let Ok(event) = self.events.try_recv() {
            handled = true;
            debug!(?event, "store event");
            if let StoreEvent::BatchStatusChanged { session_id, status } = &event {
                match status {
                    BatchStatus::Signed => self.notice.set_info(format!("Batch {session_id} signed")),
                    BatchStatus::Cancelled => {
                        self.notice.set_error(format!("Batch {session_id} cancelled"))
                    }
                    BatchStatus::Pending => {}
                }
            }
            if let Some(job) = self.coordinator.on_event(&mut self.store, &event) {
                self.spawn_job(job, ctx);
            }
        }
        if handled {
            // Coordinator dispatches land in the channel for the next frame.
            ctx.request_repaint();
        }
    }

    fn spawn_job(&self, job: SigningJob, ctx: &egui::Context) {
        info!(session_id = job.session_id(), "processing batch");
        let api = self.bridge.api();
        let results = Arc::clone(&self.job_results);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            let outcome = job.run(api.as_ref());
            match results.lock() {
                Ok(mut guard) => guard.push(outcome),
                Err(e) => error!(error = %e, "job result slot poisoned"),
            }
            ctx.request_repaint();
        });
    }

    fn check_job_results(&mut self) {
        let outcomes = match self.job_results.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(e) => {
                error!(error = %e, "job result slot poisoned");
                return;
            }
        };
        for outcome in outcomes {
            self.coordinator.finish(&mut self.store, outcome);
        }
    }

    fn open_pending_redirect(&mut self) {
        if let Some(url) = self.coordinator.last_redirect() {
            if self.opened_redirect.as_deref() != Some(url) {
                info!("opening web wallet");
                ui::open_url_new_tab(url);
                self.opened_redirect = Some(url.to_owned());
            }
        }
    }

    fn render_notice(&mut self, ui: &mut egui::Ui) {
        let mut dismiss = false;
        if let Some(error) = &self.notice.last_error {
            ui.horizontal(|ui| {
                ui::error_text(ui, error);
                dismiss = ui.small_button("✖").clicked();
            });
        } else if let Some(info) = &self.notice.last_info {
            ui.horizontal(|ui| {
                ui::info_text(ui, info);
                dismiss = ui.small_button("✖").clicked();
            });
        }
        if dismiss {
            self.notice.clear();
        }
    }

    fn render_security(&mut self, ui: &mut egui::Ui) {
        ui::section_header(ui, "Security");
        let origin = self.coordinator.config().origin.clone();
        let mut alert = ScamPhishingAlert::new(origin.clone());
        if self.security.show_authorization {
            alert = alert.with_authorization(origin, self.security.duration.clone());
        }
        scam_phishing_alert::show(ui, &alert);
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.security.show_authorization, "Show connection authorization");
            if self.security.show_authorization {
                ui.label("Duration:");
                ui::text_input(ui, &mut self.security.duration, "24 hours", 120.0);
            }
        });
    }

    fn render_login(&mut self, ui: &mut egui::Ui) {
        ui::section_header(ui, "Signer");

        if let (Some(provider_type), Some(address)) =
            (self.store.provider_type(), self.store.address())
        {
            ui.horizontal(|ui| {
                ui.label(format!("Logged in with {provider_type} as"));
                ui::copyable_value(ui, &address.to_string());
            });
            ui.label(format!("Local account nonce: {}", self.store.account_nonce()));
            if ui.button("Logout").clicked() {
                self.store.dispatch(StoreAction::Logout);
            }
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Provider:");
            egui::ComboBox::from_id_salt("provider_select")
                .selected_text(self.login_form.provider_type.as_str())
                .show_ui(ui, |ui| {
                    for provider_type in ProviderType::ALL {
                        ui.selectable_value(
                            &mut self.login_form.provider_type,
                            provider_type,
                            provider_type.as_str(),
                        );
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.label("Address:");
            ui::text_input(ui, &mut self.login_form.address, "erd1...", 520.0);
        });
        if self.login_form.provider_type != ProviderType::Wallet && !self.bridge.has_signer_bridge()
        {
            ui.label(
                egui::RichText::new("No RUSTY_DAPP_SIGNER_URL set: signatures are local placeholders.")
                    .weak(),
            );
        }
        if ui.button("Login").clicked() {
            match self.login_form.parsed_address() {
                Ok(address) => {
                    let provider = self.bridge.provider(self.login_form.provider_type);
                    self.store.dispatch(StoreAction::Login { provider, address });
                    self.notice.clear();
                }
                Err(e) => self.notice.set_error(e),
            }
        }
    }

    fn render_batch_builder(&mut self, ui: &mut egui::Ui) {
        ui::section_header(ui, "Send Transactions");

        egui::Grid::new("batch_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Receiver:");
                ui::text_input(ui, &mut self.batch_form.receiver, "erd1...", 520.0);
                ui.end_row();
                ui.label(format!("Amount ({}):", self.store.network().egld_label));
                ui::text_input(ui, &mut self.batch_form.amount, "0.1", 150.0);
                ui.end_row();
                ui.label("Data:");
                ui::text_input(ui, &mut self.batch_form.data, "optional payload", 520.0);
                ui.end_row();
                ui.label("Gas limit:");
                ui::text_input(ui, &mut self.batch_form.gas_limit, "minimum", 150.0);
                ui.end_row();
                ui.label("Batch size:");
                ui::text_input(ui, &mut self.batch_form.count, "1", 60.0);
                ui.end_row();
                ui.label("Callback route:");
                ui::text_input(ui, &mut self.batch_form.callback_route, "/dashboard", 200.0);
                ui.end_row();
            });

        ui.add_space(6.0);
        if ui.button("Send batch").clicked() {
            self.send_batch();
        }
    }

    fn send_batch(&mut self) {
        let sender = self
            .store
            .address()
            .or_else(|| self.login_form.parsed_address().ok())
            .unwrap_or(Address::ZERO);
        let transactions = match self
            .batch_form
            .build_transactions(sender, self.store.network())
        {
            Ok(txs) => txs,
            Err(e) => {
                self.notice.set_error(e);
                return;
            }
        };
        let route = self.batch_form.callback_route.trim().to_owned();
        match self
            .bridge
            .send_transactions(&mut self.store, transactions, &route)
        {
            Ok(session_id) => {
                self.notice.set_info(format!("Queued batch {session_id}"));
                self.sessions.push(session_id);
            }
            Err(e) => self.notice.set_error(format!("Failed to queue batch: {e}")),
        }
    }

    fn render_wallet_callback(&mut self, ui: &mut egui::Ui) {
        ui::section_header(ui, "Web Wallet");

        if let Some(url) = self.coordinator.last_redirect().map(str::to_owned) {
            if self.store.transactions_to_sign().is_some() {
                ui.label("Waiting for the web wallet to send you back.");
                ui.horizontal(|ui| {
                    if ui.button("Open wallet again").clicked() {
                        ui::open_url_new_tab(&url);
                    }
                    if ui.small_button("📋").on_hover_text("Copy wallet URL").clicked() {
                        ui::copy_to_clipboard(&url);
                    }
                });
            }
        }

        ui.horizontal(|ui| {
            ui.label("Callback URL:");
            ui::text_input(ui, &mut self.callback_input, "https://...?signSession=...", 520.0);
        });
        if ui.button("Apply callback").clicked() {
            self.apply_wallet_callback();
        }
    }

    fn apply_wallet_callback(&mut self) {
        match parse_wallet_callback(self.callback_input.trim()) {
            Ok(Some(callback)) => {
                let session_id = callback.session_id.clone();
                let pending = self
                    .store
                    .transactions_to_sign()
                    .is_some_and(|b| b.session_id == session_id);
                let ours = pending && self.coordinator.sign_props().session_id == session_id;
                info!(%session_id, "applying web wallet callback");
                if self.store.apply_wallet_callback(callback).is_empty() {
                    self.notice
                        .set_error(format!("No signing session {session_id} to update"));
                    return;
                }
                if ours {
                    self.coordinator.close(&mut self.store);
                }
                self.callback_input.clear();
            }
            Ok(None) => self.notice.set_error("Not a signing callback URL"),
            Err(e) => {
                warn!(error = %e, "bad wallet callback");
                self.notice.set_error(e.to_string());
            }
        }
    }

    fn render_sessions(&mut self, ui: &mut egui::Ui) {
        if self.sessions.is_empty() {
            return;
        }
        ui::section_header(ui, "Batches");
        egui::Grid::new("sessions")
            .num_columns(3)
            .striped(true)
            .show(ui, |ui| {
                for session_id in self.sessions.iter().rev() {
                    ui.label(egui::RichText::new(session_id).monospace());
                    let (text, color) = match self.store.batch_status(session_id) {
                        Some(BatchStatus::Pending) => ("pending", ui::WARNING),
                        Some(BatchStatus::Signed) => ("signed", ui::ACCENT),
                        Some(BatchStatus::Cancelled) => ("cancelled", ui::DANGER),
                        None => ("dropped", ui::DANGER),
                    };
                    ui.label(egui::RichText::new(text).color(color));
                    let signed = self
                        .store
                        .signed_batch(session_id)
                        .and_then(|b| b.transactions.as_ref())
                        .map(|txs| {
                            let nonces: Vec<String> =
                                txs.iter().map(|tx| tx.nonce.to_string()).collect();
                            format!("nonces {}", nonces.join(", "))
                        })
                        .unwrap_or_default();
                    ui.label(signed);
                    ui.end_row();
                }
            });
    }

    fn render_sign_modal(&mut self, ctx: &egui::Context) {
        if !self.coordinator.modal_visible(&self.store) {
            return;
        }
        let egld_label = self.store.network().egld_label.clone();
        let action = sign_modals::show(
            ctx,
            &ModalView {
                props: self.coordinator.sign_props(),
                steps: self.coordinator.steps(),
                summaries: self.coordinator.current_summaries(),
                egld_label: &egld_label,
            },
        );

        match action {
            Some(ModalAction::Sign) => match self.coordinator.sign_current_step(&mut self.store) {
                Ok(StepOutcome::Completed(signed)) => {
                    info!(count = signed.len(), "batch signed in app");
                }
                Ok(StepOutcome::Next) => {}
                Err(e) => warn!(error = %e, "signing step failed"),
            },
            Some(ModalAction::Cancel) => self.coordinator.cancel(&mut self.store),
            Some(ModalAction::Close) => self.coordinator.close(&mut self.store),
            None => {}
        }
    }
}
