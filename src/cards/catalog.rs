//! Default card catalog.

use super::{
    deck::Deck,
    models::{Card, DeckType},
};

/// Investments: price and the monthly income they pay once bought.
pub fn opportunity_cards() -> Vec<Card> {
    [
        ("opp_001", "Stocks", 5_000, 500, "stock"),
        ("opp_002", "Real estate", 15_000, 1_500, "real_estate"),
        ("opp_003", "Business", 25_000, 2_500, "business"),
        ("opp_004", "Bonds", 3_000, 300, "bonds"),
        ("opp_005", "Gold", 8_000, 800, "gold"),
        ("opp_006", "Cryptocurrency", 12_000, 1_200, "crypto"),
        ("opp_007", "Franchise", 35_000, 3_500, "franchise"),
        ("opp_008", "Patent", 20_000, 2_000, "patent"),
        ("opp_009", "Startup", 40_000, 4_000, "startup"),
        ("opp_010", "Investment fund", 6_000, 600, "investment"),
    ]
    .into_iter()
    .map(|(id, name, amount, income, category)| {
        Card::new(id, name, amount, category).with_income(income)
    })
    .collect()
}

pub fn expense_cards() -> Vec<Card> {
    [
        ("exp_001", "Taxes", 2_000, "tax"),
        ("exp_002", "Medical bills", 1_500, "medical"),
        ("exp_003", "Education", 3_000, "education"),
        ("exp_004", "Home repair", 2_500, "repair"),
        ("exp_005", "Insurance", 1_800, "insurance"),
        ("exp_006", "Fine", 500, "fine"),
        ("exp_007", "Celebration", 1_200, "celebration"),
        ("exp_008", "Travel", 4_000, "travel"),
        ("exp_009", "Big purchase", 2_200, "purchase"),
        ("exp_010", "Services", 800, "services"),
    ]
    .into_iter()
    .map(|(id, name, amount, category)| Card::new(id, name, amount, category))
    .collect()
}

pub fn charity_cards() -> Vec<Card> {
    [
        ("char_001", "Orphanage", 1_000, "Help for children"),
        ("char_002", "Animal shelter", 800, "Help for animals"),
        ("char_003", "Medical aid", 1_500, "Treatment for the sick"),
        ("char_004", "Education fund", 1_200, "Schooling for children"),
        ("char_005", "Ecology", 900, "Protecting nature"),
    ]
    .into_iter()
    .map(|(id, name, amount, description)| {
        Card::new(id, name, amount, "charity").with_description(description)
    })
    .collect()
}

/// Unshuffled default deck of the given type
pub fn default_deck(deck_type: DeckType) -> Deck {
    let cards = match deck_type {
        DeckType::Opportunity => opportunity_cards(),
        DeckType::Expense => expense_cards(),
        DeckType::Charity => charity_cards(),
    };
    Deck::new(deck_type, cards)
}
