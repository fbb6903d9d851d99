//! Plain-text rendering of dashboard data.

use chrono::{DateTime, Datelike, Local, Utc};

use atommarts_core::models::stats::growth_percentage;
use atommarts_core::models::{
    BadgeColor, Category, MonthlyStats, Order, Pagination, PayoutFilter, PayoutPage, Product, User,
};
use atommarts_core::utils::{format_date, format_optional, format_price, title_case, truncate_string};
use atommarts_core::SessionView;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Status text with its badge color, e.g. `Pending [warning]`.
fn badge(label: &str, color: BadgeColor) -> String {
    format!("{} [{}]", title_case(label), color)
}

/// `Page 2 of 5 (23 products), use --page 1 / --page 3`
fn page_footer(pagination: &Pagination, noun: &str) -> String {
    let mut footer = format!("{} ({} {})", pagination.label(), pagination.total_items, noun);
    let mut hints = Vec::new();
    if pagination.has_previous() {
        hints.push(format!("--page {}", pagination.page - 1));
    }
    if pagination.has_next() {
        hints.push(format!("--page {}", pagination.page + 1));
    }
    if !hints.is_empty() {
        footer.push_str(", use ");
        footer.push_str(&hints.join(" / "));
    }
    footer
}

pub fn print_already_signed_in(user: Option<&User>) {
    match user {
        Some(user) => println!("Already signed in as {}.", user.email),
        None => println!("Already signed in."),
    }
}

pub fn print_status(view: &SessionView, expires_at: Option<DateTime<Utc>>) {
    if !view.is_authenticated {
        println!("Not signed in.");
        return;
    }

    match &view.user {
        Some(user) => println!("Signed in as {} <{}> ({})", user.full_name(), user.email, user.role),
        None => println!("Signed in"),
    }
    match expires_at {
        Some(at) if at > Utc::now() => println!(
            "Access token expires {}",
            at.with_timezone(&Local).format("%b %d, %Y %H:%M")
        ),
        Some(_) => println!("Access token has expired; it will be refreshed on the next command"),
        None => println!("Access token expiry unknown"),
    }
}

pub fn print_monthly(stats: &MonthlyStats, year: i32) {
    let sales = stats.sales_for_year(year);
    let orders = stats.orders_for_year(year);
    let customers = stats.customers_for_year(year);

    println!("Monthly sales {}", year);
    println!("{:<5} {:>14} {:>8} {:>10}", "Month", "Revenue", "Orders", "Customers");
    for (i, month) in MONTHS.iter().enumerate() {
        println!(
            "{:<5} {:>14} {:>8} {:>10}",
            month,
            format_price(sales[i]),
            orders[i],
            customers[i]
        );
    }

    let total: f64 = sales.iter().sum();
    println!("Total revenue: {}", format_price(total));

    let growth = if year == Local::now().year() {
        stats.customer_growth_now()
    } else {
        growth_percentage(&customers, 11)
    };
    println!("Customer growth: {:+}%", growth);
    println!();
}

pub fn print_orders(orders: &[Order]) {
    println!("Recent orders");
    if orders.is_empty() {
        println!("  No orders yet.");
        return;
    }
    println!(
        "{:<14} {:<22} {:<13} {:>12} {:<22} {:<22}",
        "Order", "Customer", "Date", "Total", "Status", "Payment"
    );
    for order in orders {
        println!(
            "{:<14} {:<22} {:<13} {:>12} {:<22} {:<22}",
            truncate_string(&order.order_number, 14),
            truncate_string(&order.customer_name, 22),
            format_date(&order.created_at),
            format_price(order.total_amount),
            badge(&order.status, order.status_badge()),
            badge(&order.payment_status, order.payment_badge()),
        );
        println!("{:<14} {}", "", order.item_count_display());
    }
}

pub fn print_payouts(page: &PayoutPage, filter: &PayoutFilter) {
    println!(
        "Payout requests ({}): {} total",
        title_case(&filter.status),
        page.pagination.total
    );
    if page.data.is_empty() {
        println!("  No payout requests found.");
        return;
    }
    println!(
        "{:>6} {:<24} {:>12} {:<14} {:<13} {:<20}",
        "ID", "Vendor", "Amount", "Method", "Requested", "Status"
    );
    for request in &page.data {
        let marker = if request.is_actionable() { "*" } else { " " };
        println!(
            "{:>6} {:<24} {:>12} {:<14} {:<13} {:<20}{}",
            request.request_id,
            truncate_string(&request.business_name, 24),
            format_price(request.amount),
            truncate_string(&request.payment_method, 14),
            format_date(&request.request_date),
            badge(&request.status, request.badge()),
            marker,
        );
    }
    println!(
        "Page {} of {}",
        filter.page,
        page.pagination.total_pages.max(1)
    );
}

pub fn print_products(products: &[Product], pagination: &Pagination) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    println!(
        "{:>6} {:<28} {:<20} {:>10} {:<12} {:<20}",
        "ID", "Product", "Vendor", "Price", "Rating", "Status"
    );
    for product in products {
        println!(
            "{:>6} {:<28} {:<20} {:>10} {:<12} {:<20}",
            product.id,
            truncate_string(&product.name, 28),
            truncate_string(&format_optional(&product.vendor_name, "-"), 20),
            format_price(product.price),
            product.rating_display(),
            badge(&product.status, product.badge()),
        );
    }
    println!("{}", page_footer(pagination, "products"));
}

pub fn print_categories(categories: &[Category], pagination: &Pagination) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }
    println!(
        "{:>6} {:<24} {:<36} {:<13} {:<18}",
        "ID", "Name", "Description", "Created", "Status"
    );
    for category in categories {
        println!(
            "{:>6} {:<24} {:<36} {:<13} {:<18}",
            category.id,
            truncate_string(&category.name, 24),
            truncate_string(&format_optional(&category.description, "-"), 36),
            format_date(&category.created_at),
            badge(category.status_label(), category.badge()),
        );
    }
    println!("{}", page_footer(pagination, "categories"));
}
