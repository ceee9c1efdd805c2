//! Customer repository.

use async_trait::async_trait;
use sea_orm::ColumnTrait;
use std::sync::Arc;

use super::entities::customer;
use super::generic::{forward_repository, GenericRepository};
use super::{Query, Repository};
use crate::domain::Customer;
use crate::errors::AppResult;
use crate::infra::DbContext;

#[async_trait]
pub trait CustomerRepository: Repository<Customer> {
    /// Customer registered under `email`; emails are unique
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        let found = self
            .get(Query::new().filter(customer::Column::Email.eq(email)))
            .await?;
        Ok(found.into_iter().next())
    }
}

pub struct CustomersRepository {
    inner: GenericRepository<Customer>,
}

impl CustomersRepository {
    pub fn new(context: Arc<DbContext>) -> Self {
        Self {
            inner: GenericRepository::new(context),
        }
    }
}

forward_repository!(CustomersRepository, Customer);

impl CustomerRepository for CustomersRepository {}
