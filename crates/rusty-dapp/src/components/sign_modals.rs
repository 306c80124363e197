//! Provider-specific signing windows sharing one [`SignProps`] contract.

use eframe::egui;

use rusty_dapp_signing_core::{ProviderType, SignProps, SignSteps, TransactionSummary};

use super::sign_step_body;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Sign,
    Cancel,
    Close,
}

pub struct ModalView<'a> {
    pub props: SignProps,
    pub steps: Option<&'a SignSteps>,
    /// Summaries of the current screen only.
    pub summaries: &'a [TransactionSummary],
    pub egld_label: &'a str,
}

pub fn title(provider_type: Option<ProviderType>) -> &'static str {
    match provider_type {
        Some(ProviderType::Ledger) => "Confirm on Ledger",
        Some(ProviderType::Extension) => "Confirm on MultiversX DeFi Wallet",
        Some(ProviderType::WalletConnect) => "Confirm on xPortal",
        Some(ProviderType::Wallet) => "Web Wallet",
        None => "Sign Transactions",
    }
}

fn hint(provider_type: ProviderType) -> &'static str {
    match provider_type {
        ProviderType::Ledger => "Check your Ledger device and confirm each transaction.",
        ProviderType::Extension => "Review the batch, then approve it in the browser extension.",
        ProviderType::WalletConnect => "Review the batch, then approve it in the xPortal app.",
        ProviderType::Wallet => "Continue in the web wallet tab.",
    }
}

pub fn show(ctx: &egui::Context, view: &ModalView<'_>) -> Option<ModalAction> {
    let mut action = None;
    let provider_type = view.props.provider_type;

    egui::Window::new(title(provider_type))
        .id(egui::Id::new(("sign_modal", view.props.session_id.as_str())))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_min_width(460.0);

            if let Some(steps) = view.steps {
                if let Some(kind) = provider_type {
                    ui.label(egui::RichText::new(hint(kind)).weak());
                }
                if steps.total_steps() > 1 {
                    ui.label(format!(
                        "Transaction {} of {}",
                        steps.current_step() + 1,
                        steps.total_steps()
                    ));
                }
                ui.add_space(6.0);
                egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    for (i, summary) in view.summaries.iter().enumerate() {
                        if i > 0 {
                            ui.separator();
                        }
                        sign_step_body::show(ui, i, summary, view.egld_label);
                    }
                });
            }

            sign_step_body::show_error(ui, view.props.error.as_deref());

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if let Some(steps) = view.steps.filter(|s| !s.is_done()) {
                    let label = if steps.is_last() { "Sign" } else { "Sign & Continue" };
                    if ui.button(label).clicked() {
                        action = Some(ModalAction::Sign);
                    }
                    if ui.button("Cancel").clicked() {
                        action = Some(ModalAction::Cancel);
                    }
                } else if ui.button("Close").clicked() {
                    action = Some(ModalAction::Close);
                }
            });
        });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_provider_has_its_own_title() {
        let mut titles: Vec<&str> = ProviderType::ALL.iter().map(|p| title(Some(*p))).collect();
        titles.push(title(None));
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), ProviderType::ALL.len() + 1);
    }
}
