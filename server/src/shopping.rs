//! Shopping-list aggregation.
//!
//! Collapses the line-items of every recipe in a user's cart into one total
//! per ingredient, then renders the numbered plain-text list the download
//! endpoint returns.

pub const SHOPPING_LIST_HEADER: &str = "Ingredients to buy:";
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// One line-item as fetched from the cart join: ingredient name, unit, amount.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Summed amount for one ingredient across the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotal {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Group line-items by (name, unit) and sum their amounts.
///
/// Output order is the order each ingredient was first encountered, so the
/// rendered list is stable for a given query order.
pub fn aggregate(lines: &[CartLine]) -> Vec<CartTotal> {
    let mut totals: Vec<CartTotal> = Vec::new();

    for line in lines {
        match totals
            .iter_mut()
            .find(|t| t.name == line.name && t.measurement_unit == line.measurement_unit)
        {
            Some(total) => total.amount += i64::from(line.amount),
            None => totals.push(CartTotal {
                name: line.name.clone(),
                measurement_unit: line.measurement_unit.clone(),
                amount: i64::from(line.amount),
            }),
        }
    }

    totals
}

/// Render the aggregated cart as the downloadable text document.
///
/// Format: header, blank line, then `<n> <name> --- <amount> <unit>` per
/// ingredient with 1-based numbering. An empty cart yields the header only.
pub fn render(totals: &[CartTotal]) -> String {
    let mut content = format!("{}\n\n", SHOPPING_LIST_HEADER);

    for (position, total) in totals.iter().enumerate() {
        content.push_str(&format!(
            "{} {} --- {} {}\n",
            position + 1,
            total.name,
            total.amount,
            total.measurement_unit
        ));
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_amounts_per_ingredient() {
        // RecipeA: flour 500, sugar 200; RecipeB: flour 300
        let lines = vec![
            line("flour", "g", 500),
            line("sugar", "g", 200),
            line("flour", "g", 300),
        ];

        let totals = aggregate(&lines);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "flour");
        assert_eq!(totals[0].amount, 800);
        assert_eq!(totals[1].name, "sugar");
        assert_eq!(totals[1].amount, 200);
    }

    #[test]
    fn preserves_first_encounter_order() {
        let lines = vec![
            line("salt", "g", 5),
            line("flour", "g", 100),
            line("salt", "g", 3),
            line("milk", "ml", 250),
        ];

        let names: Vec<String> = aggregate(&lines).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["salt", "flour", "milk"]);
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let lines = vec![line("milk", "ml", 200), line("milk", "g", 50)];

        let totals = aggregate(&lines);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].amount, 200);
        assert_eq!(totals[1].amount, 50);
    }

    #[test]
    fn renders_numbered_lines_with_header() {
        let totals = vec![
            CartTotal {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 800,
            },
            CartTotal {
                name: "sugar".to_string(),
                measurement_unit: "g".to_string(),
                amount: 200,
            },
        ];

        let content = render(&totals);
        assert_eq!(
            content,
            "Ingredients to buy:\n\n1 flour --- 800 g\n2 sugar --- 200 g\n"
        );
    }

    #[test]
    fn empty_cart_renders_header_only() {
        assert_eq!(render(&[]), "Ingredients to buy:\n\n");
    }

    #[test]
    fn amounts_sum_in_i64() {
        let lines = vec![line("rice", "g", i32::MAX), line("rice", "g", i32::MAX)];
        let totals = aggregate(&lines);
        assert_eq!(totals[0].amount, i64::from(i32::MAX) * 2);
    }
}
