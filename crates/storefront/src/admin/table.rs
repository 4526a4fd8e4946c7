//! Admin table rows and plain-text rendering.
//!
//! These types define the column layout of the two dashboard tables and how a
//! product or order flattens into display cells.

use khushiv_core::{Order, Product};

/// Column definition for an admin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumn {
    /// Stable key for the column.
    pub key: &'static str,
    /// Header label.
    pub label: &'static str,
    /// Right-align cells (numbers, money).
    pub numeric: bool,
}

impl TableColumn {
    /// Create a left-aligned column.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: false,
        }
    }

    /// Create a right-aligned column.
    #[must_use]
    pub const fn numeric(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: true,
        }
    }
}

/// A value that can be shown as one row of a table.
pub trait TableRow {
    /// Columns this row type fills, in order.
    fn columns() -> &'static [TableColumn];

    /// Cell text, one entry per column.
    fn cells(&self) -> Vec<String>;
}

pub const PRODUCT_COLUMNS: &[TableColumn] = &[
    TableColumn::new("id", "ID"),
    TableColumn::new("name", "NAME"),
    TableColumn::numeric("price", "PRICE"),
    TableColumn::new("category", "CATEGORY"),
];

pub const ORDER_COLUMNS: &[TableColumn] = &[
    TableColumn::new("id", "ID"),
    TableColumn::new("user", "USER"),
    TableColumn::new("date", "DATE"),
    TableColumn::numeric("total", "TOTAL"),
    TableColumn::new("paid", "PAID"),
    TableColumn::new("delivered", "DELIVERED"),
];

/// Product row of the admin product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub short_id: String,
    pub name: String,
    pub price: String,
    pub category: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            short_id: product.id.short(),
            name: product.name.clone(),
            price: product.price.display(),
            category: product.category.clone(),
        }
    }
}

impl TableRow for ProductRow {
    fn columns() -> &'static [TableColumn] {
        PRODUCT_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.short_id.clone(),
            self.name.clone(),
            self.price.clone(),
            self.category.clone(),
        ]
    }
}

/// Order row of the admin order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub short_id: String,
    /// Customer name; empty when the backend did not populate the user.
    pub user: String,
    /// Creation date as `YYYY-MM-DD` (UTC).
    pub date: String,
    pub total: String,
    pub paid: bool,
    pub delivered: bool,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            short_id: order.id.short(),
            user: order
                .user
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            total: order.total_price.display(),
            paid: order.is_paid,
            delivered: order.is_delivered,
        }
    }
}

impl TableRow for OrderRow {
    fn columns() -> &'static [TableColumn] {
        ORDER_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.short_id.clone(),
            self.user.clone(),
            self.date.clone(),
            self.total.clone(),
            yes_no(self.paid).to_string(),
            yes_no(self.delivered).to_string(),
        ]
    }
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Render `rows` as an aligned plain-text table with a header line.
#[must_use]
pub fn render<R: TableRow>(rows: &[R]) -> String {
    let columns = R::columns();
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.label.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|c| c.label.to_string()).collect();
    let mut out = format_line(columns, &widths, &header);
    for row in &cells {
        out.push('\n');
        out.push_str(&format_line(columns, &widths, row));
    }
    out
}

fn format_line(columns: &[TableColumn], widths: &[usize], cells: &[String]) -> String {
    columns
        .iter()
        .zip(widths)
        .zip(cells)
        .map(|((column, &width), cell)| {
            if column.numeric {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use khushiv_core::{OrderId, OrderUser, Price, ProductId};

    use super::*;

    fn order(user: Option<&str>) -> Order {
        Order {
            id: OrderId::new("65a1f0c2e4b0a1b2c3d4e5f6"),
            user: user.map(|name| OrderUser {
                id: None,
                name: name.to_string(),
            }),
            order_items: Vec::new(),
            shipping_address: None,
            total_price: Price::from_cents(4550),
            is_paid: false,
            is_delivered: true,
            created_at: "2024-03-05T23:10:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_order_row() {
        let row = OrderRow::from(&order(Some("Asha")));
        assert_eq!(row.short_id, "65a1f0c2e4...");
        assert_eq!(row.date, "2024-03-05");
        assert_eq!(
            row.cells(),
            vec!["65a1f0c2e4...", "Asha", "2024-03-05", "$45.50", "No", "Yes"]
        );
    }

    #[test]
    fn test_order_row_without_user() {
        assert_eq!(OrderRow::from(&order(None)).user, "");
    }

    #[test]
    fn test_render_aligns_columns() {
        let rows = vec![
            ProductRow {
                short_id: ProductId::new("p1").short(),
                name: "Silk Saree".to_string(),
                price: "$120.00".to_string(),
                category: "Sarees".to_string(),
            },
            ProductRow {
                short_id: ProductId::new("p2").short(),
                name: "Kurta".to_string(),
                price: "$9.50".to_string(),
                category: "Kurtas".to_string(),
            },
        ];

        let table = render(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID  NAME          PRICE  CATEGORY");
        assert_eq!(lines[1], "p1  Silk Saree  $120.00  Sarees");
        assert_eq!(lines[2], "p2  Kurta         $9.50  Kurtas");
    }

    #[test]
    fn test_render_empty_is_header_only() {
        assert_eq!(render::<OrderRow>(&[]), "ID  USER  DATE  TOTAL  PAID  DELIVERED");
    }
}
