//! Budgeting-strategy knowledge base
//!
//! Insertion order here is the tie-break order for retrieval.

pub const BUDGET_GUIDELINES: &[&str] = &[
    "The 50/30/20 rule: allocate 50% of after-tax income to needs such as housing, utilities, groceries and insurance, 30% to wants such as dining out and entertainment, and 20% to savings and debt repayment.",
    "Zero-based budgeting: give every unit of income a job before the month starts so that income minus planned spending, saving and debt payments equals zero. Review each category from scratch instead of copying last month.",
    "The envelope system: withdraw cash for variable categories like groceries, dining and entertainment and split it into labelled envelopes. When an envelope is empty, spending in that category stops until next month.",
    "Pay yourself first: move a fixed share of every paycheck into savings automatically on payday, before paying bills or discretionary spending, so saving does not depend on what is left over.",
    "Build an emergency fund covering three to six months of essential expenses in a separate, easily accessible savings account. Start with a small goal of one month and grow it gradually.",
    "Debt avalanche: make minimum payments on every debt and put any extra money toward the debt with the highest interest rate first. This minimizes total interest paid when getting out of debt.",
    "Debt snowball: make minimum payments on every debt and put extra money toward the smallest balance first. Paying off small debts quickly builds momentum and motivation to keep going.",
    "Audit subscriptions and recurring charges every quarter. Cancel streaming services, memberships and apps you have not used in the last month, and watch for duplicate services that overlap.",
    "Stop overspending with a 24-hour rule: wait one day before any non-essential purchase above a set amount. Most impulse purchases lose their appeal, which cuts discretionary spending.",
    "Track every expense for a month and compare each category against its historical average. Categories that jump well above their usual level are the first place to cut back.",
    "Cut the biggest fixed costs first: renegotiate rent, insurance premiums, phone and internet plans, or refinance high-interest loans. One change to a large bill saves more than many small cuts.",
    "Set specific savings goals with deadlines, such as a vacation fund or down payment, and automate monthly transfers toward each goal. Visible progress makes it easier to keep saving money.",
    "Use the 30-day list for wants: write down a desired purchase and revisit it after thirty days. If it still matters and fits the budget, buy it without touching savings or adding debt.",
    "Meal planning and cooking at home reduce food spending. Plan weekly meals, shop with a list, and limit dining out and food delivery to a fixed budget each month.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidelines_nonempty_and_unique() {
        assert!(BUDGET_GUIDELINES.len() >= 10);
        let mut seen = std::collections::HashSet::new();
        for passage in BUDGET_GUIDELINES {
            assert!(!passage.trim().is_empty());
            assert!(seen.insert(*passage), "duplicate passage: {}", passage);
        }
    }
}
