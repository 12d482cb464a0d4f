//! Builders that shape provider results into cards.
//!
//! Webex renders at most five top-level actions, so list cards expand the first
//! [`MAX_DETAIL_BLOCKS`] items into show-card detail blocks and summarize the
//! rest in a trailing line.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::DateTime;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;
use tracing::info;

use crate::service::{
    amp::AmpEvent,
    reputation::ReputationRecord,
    umbrella::{DomainInvestigation, UmbrellaEvent},
};

use super::{Action, AdaptiveCard, CardAttachment, Column, Element, Fact};

/// Maximum number of items expanded into detail blocks.
pub const MAX_DETAIL_BLOCKS: usize = 5;

/// Characters left unescaped in dashboard links (matches URL `quote` semantics).
const LINK_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-').remove(b'~').remove(b'/');

fn escape(value: &str) -> String {
    utf8_percent_encode(value, LINK_ESCAPE).to_string()
}

/// Trailing line summarizing items beyond the detail blocks, if there are any.
fn overflow_line(count: usize) -> Option<Element> {
    (count > MAX_DETAIL_BLOCKS).then(|| Element::text(format!("And {} additional events.", count - MAX_DETAIL_BLOCKS)))
}

/// Render `2024-05-10T11:32:09+00:00` as `2024-05-10 11:32`.
fn short_timestamp(date: &str) -> String {
    match date.split_once('T') {
        Some((day, time)) => format!("{day} {}", time.get(..5).unwrap_or(time)),
        None => date.to_string(),
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() { "None".to_string() } else { values.join(", ") }
}

// Secure Endpoint.

/// Link to the file trajectory of a SHA-256 in the Secure Endpoint console.
pub fn amp_trajectory_url(console_url: &str, sha256: &str) -> String {
    format!("{}/file/trajectory/{sha256}", console_url.trim_end_matches('/'))
}

/// Link to the past week's events for a computer and file in the Secure Endpoint console.
pub fn amp_events_url(console_url: &str, event: &AmpEvent) -> String {
    let filter = json!({
        "filters": {
            "ag": [event.connector_guid],
            "time": ["week"],
            "sha": [event.file.identity.sha256],
        },
        "sort_by": "ts",
        "sort_order": "desc",
    });

    format!("{}/dashboard/events#/events/show/{}", console_url.trim_end_matches('/'), escape(&filter.to_string()))
}

/// Summary line for an event, omitting the user when the event has none.
fn amp_summary_line(position: usize, event: &AmpEvent) -> String {
    let mut line = format!("#{position}: {} on {}", event.event_type, event.computer.hostname);

    if let Some(user) = &event.computer.user {
        let name = user.split('@').next().unwrap_or(user);
        line.push_str(&format!(" (User: {name})"));
    }

    line
}

/// Build the card listing Secure Endpoint detection events.
pub fn amp_events_card(events: &[AmpEvent], console_url: &str) -> CardAttachment {
    info!("Building AMP Events card...");

    let mut card = AdaptiveCard::new().with_element(Element::heading(format!("{} AMP Events Found", events.len())));

    for (index, event) in events.iter().take(MAX_DETAIL_BLOCKS).enumerate() {
        let position = index + 1;

        card.push(Element::text(amp_summary_line(position, event)));

        let details = Column::emphasis(vec![
            Element::text(format!("Computer: {}", event.computer.hostname)),
            Element::text(format!("Detected at: {}", short_timestamp(&event.date))),
            Element::text(format!("Threat: {}", or_unknown(event.detection.as_deref()))),
            Element::text(format!("File Name: {}", or_unknown(event.file.file_name.as_deref()))),
            Element::text(format!("Source IP: {}", or_unknown(event.computer.external_ip.as_deref()))),
            Element::ActionSet {
                actions: vec![
                    Action::open_url("File Trajectory", amp_trajectory_url(console_url, &event.file.identity.sha256)),
                    Action::open_url("Computer Events", amp_events_url(console_url, event)),
                ],
            },
        ]);

        let sub_card = AdaptiveCard::embedded().with_element(Element::columns(vec![details]));
        card.push_action(Action::show_card(format!("Details (#{position})"), sub_card));
    }

    if let Some(line) = overflow_line(events.len()) {
        card.push(line);
    }

    info!("Card Generated.");

    card.into_attachment()
}

// Umbrella.

/// Link to the activity report for a domain in the Umbrella dashboard.
///
/// The dashboard expects its filter JSON percent-escaped, base64 encoded, then
/// escaped again.
pub fn umbrella_report_url(dashboard_url: &str, org_id: &str, domain: &str) -> String {
    let filters = json!({
        "selectedDateRangeIdx": 3,
        "domain": [{ "id": domain, "label": domain }],
    });

    let encoded = escape(&BASE64.encode(escape(&filters.to_string())));

    format!("{}/o/{org_id}/#/reports/activity?encodedFilters={encoded}", dashboard_url.trim_end_matches('/'))
}

/// Build the card listing Umbrella security events.
pub fn umbrella_events_card(events: &[UmbrellaEvent], dashboard_url: &str, org_id: &str) -> CardAttachment {
    info!("Building Umbrella Events card...");

    let mut card = AdaptiveCard::new().with_element(Element::heading(format!("{} Umbrella Events Found", events.len())));

    for (index, event) in events.iter().take(MAX_DETAIL_BLOCKS).enumerate() {
        let position = index + 1;

        card.push(Element::text(format!("#{position}: {}", event.domain)));

        let details = Column::emphasis(vec![
            Element::text(format!("Detected at: {} {}", event.date, event.time)),
            Element::text(format!("Source IP: {}", or_unknown(event.externalip.as_deref()))),
            Element::text(format!("Action: {}", event.verdict)),
        ]);

        let sub_card = AdaptiveCard::embedded()
            .with_element(Element::columns(vec![details]))
            .with_action(Action::open_url("Open Event Log", umbrella_report_url(dashboard_url, org_id, &event.domain)));

        card.push_action(Action::show_card(format!("Details (#{position})"), sub_card));
    }

    if let Some(line) = overflow_line(events.len()) {
        card.push(line);
    }

    info!("Card Generated.");

    card.into_attachment()
}

/// Build the card summarizing investigate data for one domain.
pub fn umbrella_investigate_card(investigation: &DomainInvestigation) -> CardAttachment {
    info!("Building Umbrella investigate card");

    let card = AdaptiveCard::new().with_element(Element::heading("Umbrella Investigate Data")).with_element(Element::facts(vec![
        Fact::new("Domain name:", investigation.domain.as_str()),
        Fact::new("Risk Score:", investigation.risk_score.to_string()),
        Fact::new("Security Categories:", join_or_none(&investigation.categories.security_categories)),
        Fact::new("Content Categories:", join_or_none(&investigation.categories.content_categories)),
        Fact::new("Registrar:", or_unknown(investigation.whois.registrar_name.as_deref())),
        Fact::new("Registered Date:", or_unknown(investigation.whois.created.as_deref())),
        Fact::new("Expiration Date:", or_unknown(investigation.whois.expires.as_deref())),
    ]));

    info!("Card Generated.");

    card.into_attachment()
}

// Reputation.

/// Build the card showing the most recent reputation record of an IP address.
pub fn ip_reputation_card(record: &ReputationRecord) -> CardAttachment {
    info!("Building IP Reputation card");

    let last_seen = DateTime::from_timestamp(record.seen, 0)
        .map(|seen| seen.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| record.seen.to_string());

    let facts = Element::facts(vec![
        Fact::new("Detected Activity: ", record.detection.as_str()),
        Fact::new("Determination: ", record.heuristic.as_str()),
        Fact::new("Country: ", record.cc.as_str()),
        Fact::new("Last Seen: ", last_seen),
    ]);

    let card = AdaptiveCard::new()
        .with_element(Element::heading(format!("IP Reputation for {}", record.ipaddress)))
        .with_element(Element::columns(vec![Column::emphasis(vec![facts])]));

    info!("Card Generated.");

    card.into_attachment()
}

// Containment.

/// Build the menu of containment actions for a computer.
///
/// Both submit buttons route back to `actions`, carrying the requested action
/// and the target computer.
pub fn containment_actions_card(computer: &str) -> CardAttachment {
    info!("Building containment actions card...");

    let notify_card = AdaptiveCard::embedded()
        .with_element(Element::input_text("user_email_addr", "Enter email address"))
        .with_action(Action::submit(
            "Send Message",
            "notify",
            json!({
                "callback_keyword": "actions",
                "requested_action": "notify user",
                "target_computer": computer,
            }),
        ));

    let card = AdaptiveCard::new()
        .with_element(Element::heading("Containment Actions"))
        .with_element(Element::facts(vec![Fact::new("Target system:", computer)]))
        .with_element(Element::text("Available Options:"))
        .with_element(Element::text("- Quarantine: Isolate computer from network"))
        .with_element(Element::text("- Notify User: Email user to bring in laptop for inspection"))
        .with_element(Element::text("Please select an action below:"))
        .with_action(Action::submit(
            "Quarantine",
            "quarantine",
            json!({
                "callback_keyword": "actions",
                "requested_action": "quarantine",
                "target_computer": computer,
            }),
        ))
        .with_action(Action::show_card("Notify User", notify_card));

    info!("Card Generated.");

    card.into_attachment()
}

// Tests.

#[cfg(test)]
pub(crate) mod tests {
    use percent_encoding::percent_decode_str;

    use crate::service::{
        amp::{EventComputer, EventFile, FileIdentity},
        umbrella::{DomainCategories, WhoisRecord},
    };

    use super::*;

    pub(crate) fn amp_event(index: usize, user: Option<&str>) -> AmpEvent {
        AmpEvent {
            event_type: "Threat Detected".to_string(),
            date: "2024-05-10T11:32:09+00:00".to_string(),
            connector_guid: format!("guid-{index}"),
            detection: Some("W32.Eicar".to_string()),
            computer: EventComputer {
                hostname: format!("PC-{index}"),
                user: user.map(str::to_string),
                external_ip: Some("203.0.113.5".to_string()),
            },
            file: EventFile {
                file_name: Some("eicar.com".to_string()),
                identity: FileIdentity { sha256: format!("sha-{index}") },
            },
        }
    }

    pub(crate) fn umbrella_event(index: usize) -> UmbrellaEvent {
        UmbrellaEvent {
            domain: format!("bad{index}.example.com"),
            date: "2024-05-10".to_string(),
            time: "11:32:09".to_string(),
            externalip: Some("198.51.100.7".to_string()),
            verdict: "blocked".to_string(),
        }
    }

    fn show_card_count(attachment: &CardAttachment) -> usize {
        attachment.content.actions.iter().filter(|a| matches!(a, Action::ShowCard { .. })).count()
    }

    fn body_texts(attachment: &CardAttachment) -> Vec<&str> {
        attachment.content.body.iter().filter_map(Element::as_text).collect()
    }

    #[test]
    fn test_amp_card_caps_detail_blocks() {
        let events = (1..=7).map(|i| amp_event(i, Some("jdoe@example.com"))).collect::<Vec<_>>();

        let attachment = amp_events_card(&events, "https://console.amp.cisco.com");
        let texts = body_texts(&attachment);

        assert_eq!(show_card_count(&attachment), 5);
        assert_eq!(texts[0], "7 AMP Events Found");
        assert_eq!(texts[1], "#1: Threat Detected on PC-1 (User: jdoe)");
        assert_eq!(*texts.last().unwrap(), "And 2 additional events.");
        assert_eq!(texts.len(), 1 + 5 + 1);
    }

    #[test]
    fn test_amp_card_with_exactly_five_events_has_no_overflow_line() {
        let events = (1..=5).map(|i| amp_event(i, None)).collect::<Vec<_>>();

        let attachment = amp_events_card(&events, "https://console.amp.cisco.com");

        assert_eq!(show_card_count(&attachment), 5);
        assert!(!body_texts(&attachment).iter().any(|t| t.contains("additional events")));
    }

    #[test]
    fn test_amp_card_omits_missing_user() {
        let attachment = amp_events_card(&[amp_event(1, None)], "https://console.amp.cisco.com");

        assert_eq!(body_texts(&attachment)[1], "#1: Threat Detected on PC-1");
    }

    #[test]
    fn test_amp_card_details() {
        let attachment = amp_events_card(&[amp_event(1, None)], "https://console.amp.cisco.com/");

        let Action::ShowCard { title, card } = &attachment.content.actions[0] else {
            panic!("expected a show card");
        };
        assert_eq!(title, "Details (#1)");

        let Element::ColumnSet { columns } = &card.body[0] else {
            panic!("expected a column set");
        };
        let items = &columns[0].items;
        let texts = items.iter().filter_map(Element::as_text).collect::<Vec<_>>();

        assert_eq!(
            texts,
            vec!["Computer: PC-1", "Detected at: 2024-05-10 11:32", "Threat: W32.Eicar", "File Name: eicar.com", "Source IP: 203.0.113.5"]
        );

        let Element::ActionSet { actions } = items.last().unwrap() else {
            panic!("expected an action set");
        };
        assert_eq!(actions[0], Action::open_url("File Trajectory", "https://console.amp.cisco.com/file/trajectory/sha-1"));
    }

    #[test]
    fn test_amp_events_url_carries_filter() {
        let url = amp_events_url("https://console.amp.cisco.com", &amp_event(3, None));

        let (prefix, encoded) = url.split_once("/show/").unwrap();
        let filter: serde_json::Value = serde_json::from_str(&percent_decode_str(encoded).decode_utf8().unwrap()).unwrap();

        assert_eq!(prefix, "https://console.amp.cisco.com/dashboard/events#/events");
        assert_eq!(filter["filters"]["ag"][0], "guid-3");
        assert_eq!(filter["filters"]["sha"][0], "sha-3");
        assert_eq!(filter["sort_order"], "desc");
    }

    #[test]
    fn test_umbrella_card_caps_detail_blocks() {
        let events = (1..=8).map(umbrella_event).collect::<Vec<_>>();

        let attachment = umbrella_events_card(&events, "https://dashboard.umbrella.com", "1234567");
        let texts = body_texts(&attachment);

        assert_eq!(show_card_count(&attachment), 5);
        assert_eq!(texts[0], "8 Umbrella Events Found");
        assert_eq!(texts[1], "#1: bad1.example.com");
        assert_eq!(*texts.last().unwrap(), "And 3 additional events.");
    }

    #[test]
    fn test_umbrella_report_url_round_trips() {
        let url = umbrella_report_url("https://dashboard.umbrella.com", "1234567", "bad.example.com");

        let (prefix, encoded) = url.split_once("encodedFilters=").unwrap();
        assert_eq!(prefix, "https://dashboard.umbrella.com/o/1234567/#/reports/activity?");

        let encoded_filters = percent_decode_str(encoded).decode_utf8().unwrap();
        let escaped = String::from_utf8(BASE64.decode(encoded_filters.as_bytes()).unwrap()).unwrap();
        let filters: serde_json::Value = serde_json::from_str(&percent_decode_str(&escaped).decode_utf8().unwrap()).unwrap();

        assert_eq!(filters["selectedDateRangeIdx"], 3);
        assert_eq!(filters["domain"][0]["id"], "bad.example.com");
    }

    #[test]
    fn test_investigate_card() {
        let investigation = DomainInvestigation {
            domain: "example.com".to_string(),
            risk_score: 42,
            categories: DomainCategories {
                security_categories: vec![],
                content_categories: vec!["Software/Technology".to_string(), "Business Services".to_string()],
            },
            whois: WhoisRecord {
                registrar_name: Some("Example Registrar".to_string()),
                created: Some("1995-08-14".to_string()),
                expires: None,
            },
        };

        let attachment = umbrella_investigate_card(&investigation);
        let Element::FactSet { facts } = &attachment.content.body[1] else {
            panic!("expected a fact set");
        };

        assert_eq!(facts[1], Fact::new("Risk Score:", "42"));
        assert_eq!(facts[2], Fact::new("Security Categories:", "None"));
        assert_eq!(facts[3], Fact::new("Content Categories:", "Software/Technology, Business Services"));
        assert_eq!(facts[6], Fact::new("Expiration Date:", "Unknown"));
    }

    #[test]
    fn test_ip_reputation_card() {
        let record = ReputationRecord {
            ipaddress: "192.0.2.10".to_string(),
            detection: "mirai".to_string(),
            heuristic: "botnet".to_string(),
            cc: "US".to_string(),
            seen: 1_715_340_729,
        };

        let attachment = ip_reputation_card(&record);
        let value = serde_json::to_value(&attachment).unwrap();
        let facts = &value["content"]["body"][1]["columns"][0]["items"][0]["facts"];

        assert_eq!(value["content"]["body"][0]["text"], "IP Reputation for 192.0.2.10");
        assert_eq!(facts[0]["value"], "mirai");
        assert_eq!(facts[3]["value"], "2024-05-10 11:32:09");
    }

    #[test]
    fn test_containment_actions_card() {
        let attachment = containment_actions_card("TEST-PC-1");
        let value = serde_json::to_value(&attachment).unwrap();
        let actions = &value["content"]["actions"];

        assert_eq!(value["content"]["body"][1]["facts"][0]["value"], "TEST-PC-1");
        assert_eq!(actions[0]["type"], "Action.Submit");
        assert_eq!(actions[0]["data"]["requested_action"], "quarantine");
        assert_eq!(actions[0]["data"]["target_computer"], "TEST-PC-1");
        assert_eq!(actions[1]["type"], "Action.ShowCard");
        assert_eq!(actions[1]["card"]["body"][0]["id"], "user_email_addr");
        assert_eq!(actions[1]["card"]["actions"][0]["data"]["requested_action"], "notify user");
    }
}
