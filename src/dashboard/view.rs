//! HTML views for the dashboard page and the fragments swapped in by htmx.

use maud::{Markup, PreEscaped, html};
use time::{UtcOffset, macros::format_description};

use crate::{
    alert::Alert,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SUCCESS_STYLE, CARD_HEADING_STYLE,
        CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE,
        base, format_amount, format_count, format_total, loading_spinner,
    },
    transaction::{
        ExportFormat, GenerateRequest, MAX_GENERATE_COUNT, Transaction, TransactionStats,
        TransactionStatus, TransactionType,
    },
};

pub const TRANSACTIONS_PANEL_ID: &str = "transactions-panel";
pub const STATS_PANEL_ID: &str = "stats-panel";

const CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "CAD", "AUD"];

const EMPTY_LIST_MESSAGE: &str =
    "No transactions generated yet. Use the form above to generate some!";

/// The full dashboard page.
///
/// `stats` is `None` when the stats could not be fetched, which hides the
/// stat tiles. `alert` is shown once the page loads.
pub fn dashboard_view(
    transactions: &[Transaction],
    stats: Option<&TransactionStats>,
    local_offset: UtcOffset,
    alert: Option<Alert>,
) -> Markup {
    let content = html! {
        (header())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (generate_form())
            (stats_panel(stats, false))
            (export_section())
            (transactions_panel(transactions, local_offset))
        }

        (toast_templates())

        // Toasts are fixed position, so one rendered with the page needs no container.
        @if let Some(alert) = alert
        {
            (alert.into_html())
        }
    };

    base(
        "Dashboard",
        &[HeadElement::ScriptSource(PreEscaped(
            DASHBOARD_SCRIPT.to_owned(),
        ))],
        &content,
    )
}

fn header() -> Markup {
    html! {
        header class="bg-gradient-to-r from-blue-600 to-blue-800 text-white py-6 shadow-lg"
        {
            div class="max-w-6xl mx-auto px-6"
            {
                h1 class="text-3xl font-bold flex items-center"
                {
                    span class="mr-3" { "💳" }
                    "Mock Payment Transaction Generator"
                }
                p class="text-blue-100 mt-2"
                {
                    "Generate realistic payment transactions for testing and development"
                }
            }
        }
    }
}

fn number_input(
    label: &str,
    name: &str,
    value: &str,
    min: &str,
    max: Option<&str>,
    step: &str,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }
            input
                type="number"
                id=(name)
                name=(name)
                value=(value)
                min=(min)
                max=[max]
                step=(step)
                class=(FORM_TEXT_INPUT_STYLE)
                required;
        }
    }
}

fn generate_form() -> Markup {
    let defaults = GenerateRequest::default();

    html! {
        section class=(CARD_STYLE)
        {
            h2 class=(CARD_HEADING_STYLE)
            {
                span class="mr-2" { "⚙️" }
                "Generate Transactions"
            }

            form
                id="generate-form"
                hx-post=(endpoints::DASHBOARD_GENERATE)
                hx-target={ "#" (TRANSACTIONS_PANEL_ID) }
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-disabled-elt="#generate-button, #export-button, #clear-button"
                hx-indicator="#generate-button"
                class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (number_input(
                    "Count",
                    "count",
                    &defaults.count.to_string(),
                    "1",
                    Some(&MAX_GENERATE_COUNT.to_string()),
                    "1",
                ))

                div
                {
                    label for="transaction_type" class=(FORM_LABEL_STYLE) { "Transaction Type" }
                    select id="transaction_type" name="transaction_type" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected { "Any" }
                        @for transaction_type in TransactionType::ALL
                        {
                            option value=(transaction_type.as_str()) { (transaction_type.label()) }
                        }
                    }
                }

                div
                {
                    label for="status" class=(FORM_LABEL_STYLE) { "Status" }
                    select id="status" name="status" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" selected { "Any" }
                        @for status in TransactionStatus::ALL
                        {
                            option value=(status.as_str()) { (status.label()) }
                        }
                    }
                }

                div
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                    select id="currency" name="currency" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for currency in CURRENCIES
                        {
                            option value=(currency) selected[currency == defaults.currency] { (currency) }
                        }
                    }
                }

                (number_input("Min Amount", "min_amount", &defaults.min_amount.to_string(), "0.01", None, "0.01"))
                (number_input("Max Amount", "max_amount", &defaults.max_amount.to_string(), "0.01", None, "0.01"))
                (number_input("Days Back", "days_back", &defaults.days_back.to_string(), "1", Some("365"), "1"))

                div class="flex items-end"
                {
                    button id="generate-button" type="submit" class={ "w-full " (BUTTON_PRIMARY_STYLE) }
                    {
                        span class="idle-label" { "Generate Transactions" }
                        span class="busy-label" { (loading_spinner()) "Generating..." }
                    }
                }
            }
        }
    }
}

fn stat_tile(title: &str, value: u64, icon: &str, border: &str) -> Markup {
    html! {
        div class={ "bg-white dark:bg-gray-800 rounded-lg shadow p-4 border-l-4 " (border) }
        {
            div class="flex items-center justify-between"
            {
                div
                {
                    p class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
                    p class="text-2xl font-bold" data-stat=(title) { (format_count(value)) }
                }
                span class="text-2xl" { (icon) }
            }
        }
    }
}

/// The stat tiles and breakdowns, or an empty placeholder when `stats` is `None`.
///
/// Set `out_of_band` when the panel accompanies another fragment.
pub fn stats_panel(stats: Option<&TransactionStats>, out_of_band: bool) -> Markup {
    html! {
        section id=(STATS_PANEL_ID) hx-swap-oob=[out_of_band.then_some("true")]
        {
            @if let Some(stats) = stats
            {
                div class="grid grid-cols-1 md:grid-cols-4 gap-4"
                {
                    (stat_tile("Total Transactions", stats.total_transactions, "📊", "border-blue-500"))
                    (stat_tile("Recent (7 days)", stats.recent_transactions, "🕒", "border-green-500"))
                    (stat_tile("Payment Count", stats.type_count(TransactionType::Payment), "💰", "border-purple-500"))
                    (stat_tile("Completed", stats.status_count(TransactionStatus::Completed), "✅", "border-emerald-500"))
                }

                @if stats.total_transactions > 0
                {
                    div class="grid grid-cols-1 md:grid-cols-2 gap-4 mt-4"
                    {
                        div class=(CARD_STYLE)
                        {
                            h3 class="font-semibold mb-2" { "By Type" }
                            table class="w-full text-sm"
                            {
                                tbody
                                {
                                    @for (transaction_type, breakdown) in &stats.by_type
                                    {
                                        tr
                                        {
                                            td class="py-1" { (transaction_type.label()) }
                                            td class="py-1 text-right" { (format_count(breakdown.count)) }
                                            td class="py-1 text-right" { (format_total(breakdown.total_amount)) }
                                        }
                                    }
                                }
                            }
                        }

                        div class=(CARD_STYLE)
                        {
                            h3 class="font-semibold mb-2" { "By Status" }
                            table class="w-full text-sm"
                            {
                                tbody
                                {
                                    @for (status, count) in &stats.by_status
                                    {
                                        tr
                                        {
                                            td class="py-1" { (status.label()) }
                                            td class="py-1 text-right" { (format_count(*count)) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn export_section() -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class=(CARD_HEADING_STYLE)
            {
                span class="mr-2" { "📤" }
                "Export Transactions"
            }

            form
                id="export-form"
                hx-post=(endpoints::DASHBOARD_EXPORT)
                hx-swap="none"
                hx-target-error="#alert-container"
                hx-disabled-elt="#generate-button, #export-button, #clear-button"
                hx-indicator="#export-button"
                class="flex items-center gap-4"
            {
                select id="format" name="format" class={ "max-w-40 " (FORM_TEXT_INPUT_STYLE) }
                {
                    @for format in [ExportFormat::Json, ExportFormat::Csv]
                    {
                        option value=(format.extension()) selected[format == ExportFormat::default()]
                        {
                            (format.label())
                        }
                    }
                }

                button id="export-button" type="submit" class=(BUTTON_SUCCESS_STYLE)
                {
                    span class="idle-label" { "Export All" }
                    span class="busy-label" { (loading_spinner()) "Exporting..." }
                }
            }
        }
    }
}

fn type_icon(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Payment => "💰",
        TransactionType::Refund => "↩️",
        TransactionType::Subscription => "🔄",
        TransactionType::Dispute => "⚠️",
        TransactionType::Chargeback => "❌",
    }
}

fn status_badge_style(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Completed => "bg-green-100 text-green-800",
        TransactionStatus::Pending => "bg-yellow-100 text-yellow-800",
        TransactionStatus::Failed => "bg-red-100 text-red-800",
        TransactionStatus::Cancelled => "bg-gray-100 text-gray-800",
        TransactionStatus::Refunded => "bg-orange-100 text-orange-800",
        TransactionStatus::Disputed => "bg-purple-100 text-purple-800",
    }
}

fn transaction_card(transaction: &Transaction, local_offset: UtcOffset) -> Markup {
    let timestamp = transaction
        .timestamp
        .to_offset(local_offset)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| transaction.timestamp.to_string());

    html! {
        div class="bg-white dark:bg-gray-800 rounded-lg shadow p-4 mb-3 border border-gray-200 dark:border-gray-700"
        {
            div class="flex items-start justify-between mb-2"
            {
                div class="flex items-center"
                {
                    span class="text-lg mr-2" { (type_icon(transaction.transaction_type)) }
                    div
                    {
                        p class="font-semibold" { (transaction.transaction_id) }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            time datetime=(transaction.timestamp.unix_timestamp()) { (timestamp) }
                        }
                    }
                }
                span
                    class={ "px-2 py-1 rounded-full text-xs font-medium " (status_badge_style(transaction.status)) }
                    data-status=(transaction.status.as_str())
                {
                    (transaction.status.as_str())
                }
            }

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 text-sm"
            {
                div
                {
                    p { strong { "Amount:" } " " (format_amount(transaction.amount, &transaction.currency)) }
                    p { strong { "Fee:" } " " (format_amount(transaction.fee, &transaction.currency)) }
                    p { strong { "Net:" } " " (format_amount(transaction.net_amount, &transaction.currency)) }
                }
                div
                {
                    p { strong { "From:" } " " (transaction.payer_name) " (" (transaction.payer_email) ")" }
                    p { strong { "To:" } " " (transaction.recipient_name) " (" (transaction.recipient_email) ")" }
                    p { strong { "Description:" } " " (transaction.description) }
                }
            }
        }
    }
}

/// The transaction list with its "Clear All" button.
pub fn transactions_panel(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    html! {
        section id=(TRANSACTIONS_PANEL_ID) class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-semibold flex items-center"
                {
                    span class="mr-2" { "📋" }
                    "Recent Transactions (" (transactions.len()) ")"
                }

                button
                    id="clear-button"
                    type="button"
                    hx-delete=(endpoints::DASHBOARD_TRANSACTIONS)
                    hx-confirm="Are you sure you want to clear all transactions?"
                    hx-target={ "#" (TRANSACTIONS_PANEL_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-indicator="#clear-button"
                    hx-disabled-elt="#generate-button, #export-button, #clear-button"
                    class=(BUTTON_DELETE_STYLE)
                {
                    span class="idle-label" { "Clear All" }
                    span class="busy-label" { "Clearing..." }
                }
            }

            @if transactions.is_empty()
            {
                p class="text-gray-500 text-center py-8" { (EMPTY_LIST_MESSAGE) }
            }
            @else
            {
                div class="max-h-96 overflow-y-auto"
                {
                    @for transaction in transactions
                    {
                        (transaction_card(transaction, local_offset))
                    }
                }
            }
        }
    }
}

/// Empty toasts that the page script clones for client side messages.
fn toast_templates() -> Markup {
    html! {
        template id="toast-template-success"
        {
            (Alert::Success { message: String::new() }.into_html())
        }
        template id="toast-template-error"
        {
            (Alert::Error { message: String::new(), details: String::new() }.into_html())
        }
    }
}

const DASHBOARD_SCRIPT: &str = r#"
function scheduleToastRemoval(root) {
    root.querySelectorAll('[data-toast-timeout]').forEach((toast) => {
        if (toast.dataset.toastScheduled) {
            return;
        }

        toast.dataset.toastScheduled = 'true';
        setTimeout(() => toast.remove(), Number(toast.dataset.toastTimeout));
    });
}

function showToast(kind, message) {
    const template = document.getElementById(`toast-template-${kind}`);
    const container = document.getElementById('alert-container');

    if (!template || !container) {
        return;
    }

    const toast = template.content.firstElementChild.cloneNode(true);
    toast.querySelector('[data-toast-message]').textContent = message;
    container.replaceChildren(toast);
    scheduleToastRemoval(container);
}

function downloadExport(xhr, format) {
    const contentType = xhr.getResponseHeader('Content-Type') || 'application/octet-stream';
    const blob = new Blob([xhr.response], { type: contentType });
    const url = window.URL.createObjectURL(blob);
    const link = document.createElement('a');

    link.href = url;
    link.setAttribute('download', `transactions.${format}`);
    document.body.appendChild(link);
    link.click();
    link.remove();
    window.URL.revokeObjectURL(url);
}

document.addEventListener('DOMContentLoaded', () => scheduleToastRemoval(document));
document.addEventListener('htmx:load', (event) => scheduleToastRemoval(event.detail.elt));
document.addEventListener('htmx:afterSwap', () => scheduleToastRemoval(document));

document.addEventListener('htmx:afterRequest', (event) => {
    if (event.detail.elt.id !== 'export-form') {
        return;
    }

    const xhr = event.detail.xhr;
    const format = new FormData(event.detail.elt).get('format') || 'json';

    if (event.detail.successful) {
        downloadExport(xhr, format);
        showToast('success', `Exported transactions as ${format.toUpperCase()}`);
    } else if (!xhr || !xhr.responseText) {
        // Error responses carry their own toast, this covers network failures.
        showToast('error', 'Error exporting transactions');
    }
});
"#;

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::{UtcOffset, macros::datetime};

    use crate::{
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button, assert_hx_endpoint,
            assert_valid_html, must_get_form,
        },
        transaction::{TransactionStats, TransactionStatus, test_utils::transaction_at},
    };

    use super::{dashboard_view, stats_panel, transactions_panel};

    fn select_text(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn page_has_generate_form() {
        let html = Html::parse_document(
            &dashboard_view(&[], None, UtcOffset::UTC, None).into_string(),
        );

        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/dashboard/generate", "hx-post");
        assert_hx_endpoint(&form, "#transactions-panel", "hx-target");
        assert_hx_endpoint(&form, "#alert-container", "hx-target-error");
        assert_form_input_with_value(&form, "count", "number", "10");
        assert_form_input_with_value(&form, "min_amount", "number", "1");
        assert_form_input_with_value(&form, "max_amount", "number", "1000");
        assert_form_input_with_value(&form, "days_back", "number", "30");
        assert_form_submit_button(&form);
        let type_options = select_text(&html, "select[name=transaction_type] option");
        assert_eq!(
            type_options,
            ["Any", "Payment", "Refund", "Subscription", "Dispute", "Chargeback"]
        );
        let currencies = select_text(&html, "select[name=currency] option");
        assert_eq!(currencies, ["USD", "EUR", "GBP", "CAD", "AUD"]);
    }

    #[test]
    fn empty_list_shows_prompt_and_clear_button() {
        let html = Html::parse_fragment(&transactions_panel(&[], UtcOffset::UTC).into_string());

        assert!(select_text(&html, "h2")[0].ends_with("Recent Transactions (0)"));
        assert!(
            html.root_element()
                .text()
                .collect::<String>()
                .contains("No transactions generated yet. Use the form above to generate some!")
        );
        assert_eq!(select_text(&html, "#clear-button .idle-label"), ["Clear All"]);
    }

    #[test]
    fn card_shows_local_time_and_amounts() {
        let mut transaction = transaction_at(datetime!(2025-06-30 23:30:00 UTC));
        transaction.status = TransactionStatus::Pending;
        let offset = UtcOffset::from_hms(12, 0, 0).unwrap();

        let html =
            Html::parse_fragment(&transactions_panel(&[transaction], offset).into_string());

        assert_valid_html(&html);
        assert_eq!(select_text(&html, "time"), ["2025-07-01 11:30:00"]);
        assert_eq!(select_text(&html, "[data-status]"), ["pending"]);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Amount: USD 100.00"), "got {text}");
        assert!(text.contains("Fee: USD 3.20"), "got {text}");
        assert!(text.contains("Net: USD 96.80"), "got {text}");
        assert!(text.contains("From: John Smith (john.smith@email.com)"), "got {text}");
        let clear = html
            .select(&Selector::parse("#clear-button").unwrap())
            .next()
            .expect("No clear button found");
        assert_eq!(
            clear.value().attr("hx-confirm"),
            Some("Are you sure you want to clear all transactions?")
        );
    }

    #[test]
    fn stats_tiles_show_counts() {
        let mut stats = TransactionStats {
            total_transactions: 12,
            recent_transactions: 4,
            ..Default::default()
        };
        stats.by_status.insert(TransactionStatus::Completed, 9);

        let html = Html::parse_fragment(&stats_panel(Some(&stats), false).into_string());

        assert_eq!(select_text(&html, "[data-stat]"), ["12", "4", "0", "9"]);
        let panel = html
            .select(&Selector::parse("#stats-panel").unwrap())
            .next()
            .unwrap();
        assert_eq!(panel.value().attr("hx-swap-oob"), None);
    }

    #[test]
    fn missing_stats_hide_tiles() {
        let html = Html::parse_fragment(&stats_panel(None, true).into_string());

        let panel = html
            .select(&Selector::parse("#stats-panel").unwrap())
            .next()
            .expect("No stats panel found");
        assert_eq!(panel.value().attr("hx-swap-oob"), Some("true"));
        assert!(select_text(&html, "[data-stat]").is_empty());
    }
}
