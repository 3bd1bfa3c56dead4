//! A small sales database shared by the integration tests.
//!
//! ```text
//! sale.order ──partner_id──> res.partner ──country_id──> res.country
//!     │                          └──category_id──> res.partner.category
//!     └──order_line──> sale.order.line ──product_id──> product.product
//! ```

use std::sync::Arc;

use odoo_connect::Client;
use serde_json::json;

use super::mocks::MockTransport;

/// Mock server holding the sales fixture, reporting `major` as its version.
pub fn sales_transport(major: u32) -> MockTransport {
    MockTransport::new(major)
        .with_model(
            "sale.order",
            json!({
                "id": {"type": "integer", "string": "ID"},
                "name": {"type": "char", "string": "Order Reference", "required": true},
                "date_order": {"type": "datetime", "string": "Order Date"},
                "state": {"type": "selection", "string": "Status"},
                "amount_total": {"type": "monetary", "string": "Total"},
                "partner_id": {"type": "many2one", "string": "Customer", "relation": "res.partner"},
                "order_line": {"type": "one2many", "string": "Order Lines", "relation": "sale.order.line"},
            }),
            json!([
                {"id": 1, "name": "SO001", "date_order": "2024-01-15 10:00:00", "state": "sale",
                 "amount_total": 120.0, "partner_id": 5, "order_line": [11, 12]},
                {"id": 2, "name": "SO002", "date_order": "2024-02-03 09:30:00", "state": "draft",
                 "amount_total": 0.0, "partner_id": false, "order_line": []},
                {"id": 3, "name": "SO003", "date_order": "2024-02-20 16:45:00", "state": "sale",
                 "amount_total": 42.5, "partner_id": 6, "order_line": [13]},
            ]),
        )
        .with_model(
            "sale.order.line",
            json!({
                "id": {"type": "integer"},
                "name": {"type": "text"},
                "product_uom_qty": {"type": "float"},
                "order_id": {"type": "many2one", "relation": "sale.order"},
                "product_id": {"type": "many2one", "relation": "product.product"},
            }),
            json!([
                {"id": 11, "name": "Desk", "product_uom_qty": 1.0, "order_id": 1, "product_id": 101},
                {"id": 12, "name": "Chair", "product_uom_qty": 4.0, "order_id": 1, "product_id": 102},
                {"id": 13, "name": "Desk", "product_uom_qty": 2.0, "order_id": 3, "product_id": 101},
            ]),
        )
        .with_model(
            "product.product",
            json!({
                "id": {"type": "integer"},
                "name": {"type": "char"},
                "default_code": {"type": "char"},
            }),
            json!([
                {"id": 101, "name": "Office Desk", "default_code": "DESK"},
                {"id": 102, "name": "Office Chair", "default_code": "CHAIR"},
            ]),
        )
        .with_model(
            "res.partner",
            json!({
                "id": {"type": "integer"},
                "name": {"type": "char", "string": "Name"},
                "email": {"type": "char"},
                "country_id": {"type": "many2one", "relation": "res.country"},
                "category_id": {"type": "many2many", "relation": "res.partner.category"},
            }),
            json!([
                {"id": 5, "name": "Acme", "email": "info@acme.test", "country_id": 21, "category_id": [2, 1]},
                {"id": 6, "name": "Globex", "email": false, "country_id": false, "category_id": []},
            ]),
        )
        .with_model(
            "res.country",
            json!({
                "id": {"type": "integer"},
                "name": {"type": "char"},
                "code": {"type": "char"},
            }),
            json!([{"id": 21, "name": "Belgium", "code": "BE"}]),
        )
        .with_model(
            "res.partner.category",
            json!({
                "id": {"type": "integer"},
                "name": {"type": "char"},
            }),
            json!([{"id": 1, "name": "Gold"}, {"id": 2, "name": "VIP"}]),
        )
        .with_model(
            "ir.model",
            json!({
                "id": {"type": "integer"},
                "model": {"type": "char"},
            }),
            json!([
                {"id": 1, "model": "res.partner"},
                {"id": 2, "model": "sale.order"},
            ]),
        )
        .with_model(
            "ir.model.data",
            json!({
                "id": {"type": "integer"},
                "module": {"type": "char"},
                "name": {"type": "char"},
                "model": {"type": "char"},
                "res_id": {"type": "many2one_reference"},
            }),
            json!([
                {"id": 900, "module": "base", "name": "partner_acme", "model": "res.partner", "res_id": 5},
                {"id": 901, "module": "base", "name": "partner_gone", "model": "res.partner", "res_id": 77},
            ]),
        )
}

/// A client over `transport`, keeping a handle on the mock for call
/// inspection.
pub fn client_for(transport: MockTransport) -> (Client, Arc<MockTransport>) {
    let mock = Arc::new(transport);
    (Client::from_transport(mock.clone()), mock)
}
