/// Keyword-based product classification for one company's tickets.
///
/// Each ticket description is matched, case-insensitively, against an ordered
/// list of keyword rules. The first rule with any matching keyword wins;
/// tickets matching no rule fall into [`ProductCategory::General`].
use serde::Serialize;

use super::reporter::{PriorityBreakdown, breakdown_by};
use crate::tickets::model::Ticket;

/// Product bucket a ticket is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProductCategory {
    #[serde(rename = "Booking/Reservation")]
    Booking,
    #[serde(rename = "Payment/Refund")]
    Payment,
    #[serde(rename = "Delivery/Shipping")]
    Delivery,
    #[serde(rename = "Account/Access")]
    Account,
    #[serde(rename = "Product/Item")]
    Product,
    #[serde(rename = "Service/Support")]
    Service,
    General,
}

impl ProductCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Booking => "Booking/Reservation",
            Self::Payment => "Payment/Refund",
            Self::Delivery => "Delivery/Shipping",
            Self::Account => "Account/Access",
            Self::Product => "Product/Item",
            Self::Service => "Service/Support",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered keyword rules. Earlier rules take precedence.
const PRODUCT_RULES: &[(ProductCategory, &[&str])] = &[
    (ProductCategory::Booking, &["booking", "reservation"]),
    (ProductCategory::Payment, &["payment", "refund"]),
    (ProductCategory::Delivery, &["delivery", "shipping"]),
    (ProductCategory::Account, &["account", "login"]),
    (ProductCategory::Product, &["product", "item"]),
    (ProductCategory::Service, &["service", "support"]),
];

/// Classify an issue description.
pub fn classify(description: &str) -> ProductCategory {
    let issue = description.to_lowercase();
    PRODUCT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| issue.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ProductCategory::General)
}

fn classify_ticket(ticket: &Ticket) -> ProductCategory {
    classify(ticket.issue_description.as_deref().unwrap_or(""))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductStat {
    pub category: String,
    #[serde(flatten)]
    pub counts: PriorityBreakdown,
}

/// Product breakdown of a single company's tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductAnalysis {
    pub company: String,
    pub ticket_count: usize,
    /// Categories in first-seen order.
    pub categories: Vec<ProductStat>,
}

/// Analyze the tickets of `company` (exact match on the displayed company).
pub fn analyze_company(tickets: &[Ticket], company: &str) -> ProductAnalysis {
    let company_tickets: Vec<&Ticket> = tickets.iter().filter(|t| t.company() == company).collect();

    let categories = breakdown_by(company_tickets.iter().copied(), |t| {
        classify_ticket(t).label().to_string()
    })
    .into_iter()
    .map(|(category, counts)| ProductStat { category, counts })
    .collect();

    ProductAnalysis {
        company: company.to_string(),
        ticket_count: company_tickets.len(),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_refund_classifies_as_payment() {
        assert_eq!(classify("Payment issue with refund"), ProductCategory::Payment);
    }

    #[test]
    fn no_keyword_is_general() {
        assert_eq!(classify("The app crashes on startup"), ProductCategory::General);
        assert_eq!(classify(""), ProductCategory::General);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("DELIVERY was late"), ProductCategory::Delivery);
        assert_eq!(classify("Cannot LOGIN"), ProductCategory::Account);
    }

    #[test]
    fn first_rule_wins() {
        // booking precedes payment in rule order
        assert_eq!(
            classify("refund for my booking"),
            ProductCategory::Booking
        );
        // payment precedes support
        assert_eq!(
            classify("support never answered about payment"),
            ProductCategory::Payment
        );
    }

    #[test]
    fn substring_matches_count() {
        // "items" contains "item"
        assert_eq!(classify("missing items"), ProductCategory::Product);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(ProductCategory::Service.to_string(), "Service/Support");
        assert_eq!(ProductCategory::General.label(), "General");
    }

    #[test]
    fn analyze_company_only_counts_that_company() {
        let tickets: Vec<Ticket> = [
            json!({ "companyName": "Acme", "issueDescription": "Refund please", "priority": "HIGH" }),
            json!({ "companyName": "Acme", "issueDescription": "payment failed", "priority": "LOW" }),
            json!({ "companyName": "Acme", "issueDescription": "hello" }),
            json!({ "companyName": "Globex", "issueDescription": "Refund please" }),
        ]
        .iter()
        .map(Ticket::from_json)
        .collect();

        let analysis = analyze_company(&tickets, "Acme");
        assert_eq!(analysis.company, "Acme");
        assert_eq!(analysis.ticket_count, 3);
        assert_eq!(analysis.categories.len(), 2);

        let payment = &analysis.categories[0];
        assert_eq!(payment.category, "Payment/Refund");
        assert_eq!(payment.counts.total, 2);
        assert_eq!(payment.counts.high, 1);
        assert_eq!(payment.counts.low, 1);

        assert_eq!(analysis.categories[1].category, "General");
    }

    #[test]
    fn analyze_unknown_company_is_empty() {
        let tickets = vec![Ticket::from_json(&json!({ "companyName": "Acme" }))];
        let analysis = analyze_company(&tickets, "Nobody");
        assert_eq!(analysis.ticket_count, 0);
        assert!(analysis.categories.is_empty());
    }
}
