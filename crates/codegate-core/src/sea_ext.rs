use sea_orm::{EntityTrait, QuerySelect, Select};

use codegate_domain::pagination::PageRequest;

/// Apply 1-indexed offset pagination to a select.
pub trait Paginate {
    fn paginate_by(self, page: PageRequest) -> Self;
}

impl<E> Paginate for Select<E>
where
    E: EntityTrait,
{
    fn paginate_by(self, page: PageRequest) -> Self {
        let page = page.clamped();
        self.offset(page.offset()).limit(page.limit())
    }
}
