use libris_domain::pagination::Sort;
use sea_orm::{EntityTrait, IntoSimpleExpr, Order, QueryOrder, Select};

/// Convert the domain sort direction into a sea-orm `Order`.
pub fn order_of(sort: Sort) -> Order {
    match sort {
        Sort::Asc => Order::Asc,
        Sort::Desc => Order::Desc,
    }
}

pub trait OrderBySort {
    /// `ORDER BY <col> <sort>` using the domain sort direction.
    fn order_by_sort<C: IntoSimpleExpr>(self, col: C, sort: Sort) -> Self;
}

impl<E> OrderBySort for Select<E>
where
    E: EntityTrait,
{
    fn order_by_sort<C: IntoSimpleExpr>(self, col: C, sort: Sort) -> Self {
        self.order_by(col, order_of(sort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_sort_to_order() {
        assert!(matches!(order_of(Sort::Asc), Order::Asc));
        assert!(matches!(order_of(Sort::Desc), Order::Desc));
    }
}
