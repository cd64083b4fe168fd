use scl_types::{Field, Stage};

use crate::rules::FieldRule;

/// Field names that do not end up in the record as-is.
pub const ROUTE_FROM: &str = "Transportation Route From";
pub const ROUTE_TO: &str = "Transportation Route To";
pub const ROUTE: &str = "Transportation Route";

/// Field filled in from the ledger's return number generator.
pub const RETURN_NUMBER: &str = "Product Return Number";

/// Field whose value is checked against the expected worthiness.
pub const WORTHINESS_STATUS: &str = "Product Worthiness Status";

/// Customer Delivery Satisfaction field the expected worthiness is read from.
pub const SATISFACTION_SURVEY: &str = "Satisfaction Survey";

const ORDER_STATES: &[&str] = &["pending", "in progress", "completed", "cancelled"];
const RATINGS: &[&str] = &["excellent", "good", "average", "poor"];

/// One field of a stage form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: &'static str,
    pub rule: FieldRule,
}

impl FieldSpec {
    const fn new(name: &'static str, prompt: &'static str, rule: FieldRule) -> Self {
        Self { name, prompt, rule }
    }
}

/// The ordered fields collected for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageForm {
    pub stage: Stage,
    pub fields: Vec<FieldSpec>,
    /// Field the user is asked to confirm against the expected worthiness
    /// once the form is complete.
    pub confirms: Option<&'static str>,
}

impl StageForm {
    pub fn for_stage(stage: Stage) -> Self {
        use FieldRule::*;

        let fields = match stage {
            Stage::Procurement => vec![
                FieldSpec::new("Supplier ID", "Enter Supplier ID (format: SID12345)", PrefixedId { prefix: "SID" }),
                FieldSpec::new("Supplier Name", "Enter Supplier Name", FreeText),
                FieldSpec::new("Order Quantity", "Enter Order Quantity", Quantity),
                FieldSpec::new("Order Date", "Enter Order Date (format: dd/mm/yy)", Date),
                FieldSpec::new(
                    "Order State",
                    "Enter Order State (Pending, In Progress, Completed, Cancelled)",
                    OneOf(ORDER_STATES),
                ),
                FieldSpec::new("Shipping Details", "Enter Shipping Details", FreeText),
            ],
            Stage::InventoryStorage => vec![
                FieldSpec::new("Warehouse ID", "Enter Warehouse ID (format: WID12345)", PrefixedId { prefix: "WID" }),
                FieldSpec::new("Storage Location", "Enter Storage Location (format: city, state)", Location),
                FieldSpec::new("Inventory Quantity", "Enter Inventory Quantity", Quantity),
                FieldSpec::new(
                    "Inventory Status",
                    "Enter Inventory Status (Available, Low Stock, or Not Available)",
                    OneOf(&["available", "low stock", "not available"]),
                ),
            ],
            Stage::OrderFulfillment => vec![
                FieldSpec::new("Customer ID", "Enter Customer ID (format: CID12345)", PrefixedId { prefix: "CID" }),
                FieldSpec::new("Order Quantity", "Enter Order Quantity", Quantity),
                FieldSpec::new("Order Date", "Enter Order Date (format: dd/mm/yy)", Date),
                FieldSpec::new(
                    "Order State",
                    "Enter Order State (Pending, In Progress, Completed, Cancelled)",
                    OneOf(ORDER_STATES),
                ),
                FieldSpec::new("Shipping Details", "Enter Shipping Details", FreeText),
            ],
            Stage::Transportation => vec![
                FieldSpec::new(
                    "Transportation Mode",
                    "Enter Transportation Mode (Road, Rail, Sea, Air)",
                    OneOf(&["road", "rail", "sea", "air"]),
                ),
                FieldSpec::new("Transportation Company", "Enter Transportation Company", FreeText),
                FieldSpec::new(ROUTE_FROM, "Enter Transportation Route From (format: city, state)", Location),
                FieldSpec::new(ROUTE_TO, "Enter Transportation Route To (format: city, state)", Location),
                FieldSpec::new(
                    "Transportation Departure Date",
                    "Enter Transportation Departure Date (format: dd/mm/yy)",
                    Date,
                ),
                FieldSpec::new(
                    "Transportation Estimated Arrival Date",
                    "Enter Transportation Estimated Arrival Date (format: dd/mm/yy)",
                    DateNotBefore { field: "Transportation Departure Date" },
                ),
            ],
            Stage::CustomerDeliverySatisfaction => vec![
                FieldSpec::new(
                    "Delivery Confirmation",
                    "Enter Delivery Confirmation (Delivered, Unsuccessful, Rescheduled)",
                    OneOf(&["delivered", "unsuccessful", "rescheduled"]),
                ),
                FieldSpec::new(
                    "Customer Feedback Collection",
                    "Enter Customer Feedback Collection Result (Excellent, Good, Average, Poor)",
                    OneOf(RATINGS),
                ),
                FieldSpec::new(
                    SATISFACTION_SURVEY,
                    "Enter Satisfaction Survey Result (format: 1-10)",
                    IntRange { min: 1, max: 10 },
                ),
            ],
            Stage::QualityControl => vec![
                FieldSpec::new(
                    "Quality Inspection Result",
                    "Enter Product Quality Inspection Result (Pass, Fail)",
                    OneOf(&["pass", "fail"]),
                ),
                FieldSpec::new(
                    "Product Quality",
                    "Enter Product Quality (Excellent, Good, Average, Poor)",
                    OneOf(RATINGS),
                ),
            ],
            Stage::ProductReturn => vec![
                FieldSpec::new(RETURN_NUMBER, "", Generated),
                FieldSpec::new(
                    "Product Return Status",
                    "Enter Product Return Status (Returned, Not Returned)",
                    OneOf(&["returned", "not returned"]),
                ),
                FieldSpec::new(
                    "Product Refund Status",
                    "Enter Product Refund Status (Refunded, Not Refunded)",
                    OneOf(&["refunded", "not refunded"]),
                ),
                FieldSpec::new("Product Return Reason", "Enter Product Return Reason", FreeText),
            ],
            Stage::ProductWorthiness => vec![
                FieldSpec::new(
                    WORTHINESS_STATUS,
                    "Enter Product Worthiness Status (Continue Product, Discontinue Product)",
                    OneOf(&["continue product", "discontinue product"]),
                ),
                FieldSpec::new("Product Worthiness Reason", "Enter Product Worthiness Reason", FreeText),
            ],
        };

        let confirms = (stage == Stage::ProductWorthiness).then_some(WORTHINESS_STATUS);
        Self { stage, fields, confirms }
    }

    /// Forms for every stage, in menu order.
    pub fn all() -> Vec<Self> {
        Stage::ALL.into_iter().map(Self::for_stage).collect()
    }

    pub fn needs_locations(&self) -> bool {
        self.fields.iter().any(|f| f.rule.needs_locations())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Turn collected answers into record fields. The two route halves are
    /// joined into a single `Transportation Route` field at the position of
    /// the first.
    pub fn assemble(&self, collected: Vec<Field>) -> Vec<Field> {
        let from = collected.iter().find(|f| f.name == ROUTE_FROM).map(|f| f.value.clone());
        let to = collected.iter().find(|f| f.name == ROUTE_TO).map(|f| f.value.clone());

        let mut out = Vec::with_capacity(collected.len());
        for field in collected {
            match field.name.as_str() {
                ROUTE_FROM => out.push(Field::new(
                    ROUTE,
                    format!("{} to {}", field.value, to.as_deref().unwrap_or_default()),
                )),
                ROUTE_TO if from.is_some() => {}
                ROUTE_TO => out.push(Field::new(ROUTE, format!(" to {}", field.value))),
                _ => out.push(field),
            }
        }
        out
    }
}
