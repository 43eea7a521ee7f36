//! Messaging and payment links for settlement results
//!
//! Builds WhatsApp click-to-chat links for payers and UPI deep links for
//! receivers. Query values are form-encoded by [`url::Url`].

use crate::{
    config::DisplayConfig,
    report::{format_currency, round_amount},
    types::{SettlementReport, Transfer},
    Result,
};
use rust_decimal::Decimal;
use url::Url;

/// Links offered for one suggested transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentActions {
    /// The transfer
    pub transfer: Transfer,

    /// Prefilled message for the payer
    pub message: String,

    /// WhatsApp link to the payer, when they have a phone
    pub whatsapp: Option<Url>,

    /// UPI link paying the receiver, when they have a UPI id
    pub upi: Option<Url>,
}

/// Quick actions for one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonActions {
    /// Participant name
    pub name: String,

    /// Net balance
    pub net: Decimal,

    /// Receive / owe / settled message
    pub status: String,

    /// WhatsApp link carrying the status, when they have a phone
    pub whatsapp: Option<Url>,

    /// UPI link requesting what they are owed, for net receivers with a UPI id
    pub upi_request: Option<Url>,
}

/// `https://wa.me/<digits>?text=...`, or `None` without a usable phone
pub fn whatsapp_link(phone: &str, text: &str) -> Result<Option<Url>> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Ok(None);
    }

    let url = Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", text)])?;
    Ok(Some(url))
}

/// `upi://pay?pa=..&pn=..&am=..&cu=INR&tn=..`, or `None` without a VPA
pub fn upi_uri(vpa: &str, payee_name: &str, amount: Decimal, note: &str) -> Result<Option<Url>> {
    let vpa = vpa.trim();
    if vpa.is_empty() {
        return Ok(None);
    }

    let amount = format!("{:.2}", round_amount(amount, 2));
    let url = Url::parse_with_params(
        "upi://pay",
        &[
            ("pa", vpa),
            ("pn", payee_name),
            ("am", amount.as_str()),
            ("cu", "INR"),
            ("tn", note),
        ],
    )?;
    Ok(Some(url))
}

/// "Hi B, please pay ₹100.00 to A for 'Goa'."
pub fn transfer_message(transfer: &Transfer, display: &DisplayConfig) -> String {
    format!(
        "Hi {}, please pay {} to {} for '{}'.",
        transfer.from,
        format_currency(
            transfer.amount,
            &display.currency_symbol,
            display.decimal_places
        ),
        transfer.to,
        display.place_name
    )
}

/// Receive / owe / settled message for one participant
pub fn status_message(name: &str, net: Decimal, display: &DisplayConfig) -> String {
    let fmt = |amount: Decimal| {
        format_currency(amount, &display.currency_symbol, display.decimal_places)
    };

    if round_amount(net, display.decimal_places).is_zero() {
        format!("Hi {}, you're settled for '{}'.", name, display.place_name)
    } else if net > Decimal::ZERO {
        format!(
            "Hi {}, you will receive {} for '{}'.",
            name,
            fmt(net),
            display.place_name
        )
    } else {
        format!(
            "Hi {}, you owe {} for '{}'.",
            name,
            fmt(-net),
            display.place_name
        )
    }
}

impl SettlementReport {
    /// Messages and links for every suggested transfer
    pub fn payment_actions(&self, display: &DisplayConfig) -> Result<Vec<PaymentActions>> {
        self.transfers
            .iter()
            .map(|transfer| {
                let payer = self.participants.iter().find(|p| p.name == transfer.from);
                let receiver = self.participants.iter().find(|p| p.name == transfer.to);
                let message = transfer_message(transfer, display);

                let whatsapp = match payer.and_then(|p| p.phone.as_deref()) {
                    Some(phone) => whatsapp_link(phone, &message)?,
                    None => None,
                };

                let upi = match receiver.and_then(|p| p.upi_id.as_deref()) {
                    Some(vpa) => upi_uri(
                        vpa,
                        &transfer.to,
                        transfer.amount,
                        &format!("Payment to {} for {}", transfer.to, display.place_name),
                    )?,
                    None => None,
                };

                Ok(PaymentActions {
                    transfer: transfer.clone(),
                    message,
                    whatsapp,
                    upi,
                })
            })
            .collect()
    }

    /// Status message and links per participant, in participant order
    pub fn person_actions(&self, display: &DisplayConfig) -> Result<Vec<PersonActions>> {
        self.participants
            .iter()
            .map(|p| {
                let status = status_message(&p.name, p.net, display);

                let whatsapp = match p.phone.as_deref() {
                    Some(phone) => whatsapp_link(phone, &status)?,
                    None => None,
                };

                let receives = round_amount(p.net, display.decimal_places) > Decimal::ZERO;
                let upi_request = match p.upi_id.as_deref() {
                    Some(vpa) if receives => upi_uri(
                        vpa,
                        &p.name,
                        p.net.abs(),
                        &format!("Receive from group for {}", display.place_name),
                    )?,
                    _ => None,
                };

                Ok(PersonActions {
                    name: p.name.clone(),
                    net: p.net,
                    status,
                    whatsapp,
                    upi_request,
                })
            })
            .collect()
    }
}
