//! User service - Handles customer-related business logic.
//!
//! SOLID (SRP): Handles customer use cases only.
//! DDD: Orchestrates domain operations via Unit of Work.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::Customer;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{
    ConflictPolicy, CustomerRepository, CustomersRepository, DbContext, Repository, UnitOfWork,
};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a new customer; emails must be unused
    async fn register_customer(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> AppResult<Customer>;

    async fn get_customer(&self, id: i32) -> AppResult<Customer>;

    async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<Customer>>;

    /// Change a customer's name; concurrent edits are overwritten
    async fn rename_customer(&self, id: i32, first_name: &str, last_name: &str)
        -> AppResult<Customer>;

    /// Remove a customer; removing an unknown id succeeds
    async fn remove_customer(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    context: Arc<dyn UnitOfWork>,
    customers: Arc<dyn CustomerRepository>,
    policy: ConflictPolicy,
}

impl UserManager {
    /// Create new user service instance with Unit of Work
    pub fn new(context: Arc<dyn UnitOfWork>, customers: Arc<dyn CustomerRepository>) -> Self {
        Self {
            context,
            customers,
            policy: ConflictPolicy::default(),
        }
    }

    /// Create the service with a customer repository sharing `context`.
    pub fn from_context(context: Arc<DbContext>) -> Self {
        let customers = Arc::new(CustomersRepository::new(Arc::clone(&context)));
        Self::new(context, customers)
    }

    /// Save staged changes; on failure they are dropped so the next call
    /// starts clean.
    async fn commit(&self) -> AppResult<u64> {
        let result = self.context.save_changes_with(self.policy).await;
        if let Err(e) = &result {
            tracing::warn!(code = e.code(), "Save failed, staged changes discarded");
            self.context.discard_changes();
        }
        result
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register_customer(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> AppResult<Customer> {
        if self.customers.find_by_email(email).await?.is_some() {
            return Err(AppError::validation(format!("{} is already registered", email)));
        }

        let entry = self.customers.insert(Customer::new(first_name, last_name, email));
        self.commit().await?;
        Ok(entry.current())
    }

    async fn get_customer(&self, id: i32) -> AppResult<Customer> {
        self.customers.get_by_id(id).await?.ok_or_not_found()
    }

    async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        self.customers.find_by_email(email).await
    }

    async fn rename_customer(
        &self,
        id: i32,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<Customer> {
        let mut customer = self.get_customer(id).await?;
        customer.first_name = first_name.to_string();
        customer.last_name = last_name.to_string();

        let entry = self.customers.update(customer);
        self.commit().await?;
        Ok(entry.current())
    }

    async fn remove_customer(&self, id: i32) -> AppResult<()> {
        self.customers.delete_by_id(id).await?;
        if self.context.has_changes() {
            self.commit().await?;
        }
        Ok(())
    }
}
