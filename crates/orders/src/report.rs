//! Sales summary over a set of orders.

use serde::Serialize;

use stockroom_core::Money;

use crate::{Order, OrderStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub order_count: usize,
    pub completed_count: usize,
    pub pending_count: usize,
    pub cancelled_count: usize,
    /// Sum of `total_amount` over completed orders only.
    pub revenue: Money,
    /// Units sold across completed orders.
    pub items_sold: i64,
}

impl SalesSummary {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut summary = Self::default();

        for order in orders {
            summary.order_count += 1;
            match order.status {
                OrderStatus::Pending => summary.pending_count += 1,
                OrderStatus::Cancelled => summary.cancelled_count += 1,
                OrderStatus::Completed => {
                    summary.completed_count += 1;
                    summary.revenue += order.total_amount;
                    summary.items_sold += order.items.iter().map(|i| i.quantity).sum::<i64>();
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use stockroom_core::{CustomerId, OrderId, OrderItemId, ProductId, StaffId};

    use super::*;
    use crate::{NewOrder, NewOrderItem};

    fn order(id: i64, status: OrderStatus, quantity: i64) -> Order {
        let draft = NewOrder {
            customer_id: CustomerId::new(1),
            staff_id: StaffId::new(1),
            items: vec![NewOrderItem {
                product_id: ProductId::new(1),
                quantity,
                unit_price: Decimal::new(1000, 2),
            }],
            code: None,
            order_date: None,
            status: Some(status),
        }
        .into_draft(Utc::now())
        .unwrap();
        Order::from_draft(OrderId::new(id), draft, &[OrderItemId::new(id)])
    }

    #[test]
    fn only_completed_orders_count_as_revenue() {
        let orders = vec![
            order(1, OrderStatus::Completed, 2),
            order(2, OrderStatus::Pending, 5),
            order(3, OrderStatus::Cancelled, 1),
            order(4, OrderStatus::Completed, 1),
        ];

        let summary = SalesSummary::from_orders(&orders);
        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.revenue, Decimal::new(3000, 2));
        assert_eq!(summary.items_sold, 3);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(SalesSummary::from_orders(&[]), SalesSummary::default());
    }
}
