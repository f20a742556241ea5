//! Expense repository backed by PostgreSQL.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use spendflow_core::auth::Role;
use spendflow_core::expense::{Expense, ExpenseRepository, RepositoryError, StatusUpdate};
use spendflow_core::workflow::{ApprovalAction, ApprovalFlow, ApprovalState, ExpenseStatus};
use spendflow_shared::types::{CurrencyCode, ExpenseId, UserId};

use crate::entities::expenses;

/// `SeaORM` implementation of [`ExpenseRepository`].
///
/// Status updates are compare-and-swap on the `version` column:
/// `UPDATE ... WHERE id = $1 AND version = $2`.
#[derive(Debug, Clone)]
pub struct SeaOrmExpenseRepository {
    db: DatabaseConnection,
}

impl SeaOrmExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: ExpenseId) -> Result<Option<expenses::Model>, RepositoryError> {
        expenses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)
    }

    async fn list_where(
        &self,
        query: sea_orm::Select<expenses::Entity>,
    ) -> Result<Vec<Expense>, RepositoryError> {
        query
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(model_to_expense)
            .collect()
    }
}

#[async_trait]
impl ExpenseRepository for SeaOrmExpenseRepository {
    async fn create(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let id = expense.id;
        let model = expense_to_active(&expense)?;
        match model.insert(&self.db).await {
            Ok(inserted) => model_to_expense(inserted),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RepositoryError::Duplicate(id))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    async fn find_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        self.find_model(id).await?.map(model_to_expense).transpose()
    }

    async fn list_by_approver(&self, role: Role) -> Result<Vec<Expense>, RepositoryError> {
        self.list_where(
            expenses::Entity::find()
                .filter(expenses::Column::Status.eq("pending"))
                .filter(expenses::Column::StatusRole.eq(role.as_str())),
        )
        .await
    }

    async fn list_by_submitter(&self, user: UserId) -> Result<Vec<Expense>, RepositoryError> {
        self.list_where(
            expenses::Entity::find().filter(expenses::Column::SubmitterId.eq(user.into_inner())),
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        self.list_where(expenses::Entity::find()).await
    }

    async fn update_status(
        &self,
        id: ExpenseId,
        expected_version: i64,
        update: StatusUpdate,
    ) -> Result<Expense, RepositoryError> {
        let current = self
            .find_model(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;
        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                id,
                expected: expected_version,
            });
        }

        // The history read above belongs to `expected_version`; the version
        // filter below guarantees nobody appended in between.
        let mut history = parse_history(&current)?;
        history.push(update.action);

        let result = expenses::Entity::update_many()
            .col_expr(
                expenses::Column::Status,
                sea_orm::sea_query::Expr::value(update.approval.status.as_str()),
            )
            .col_expr(
                expenses::Column::StatusRole,
                sea_orm::sea_query::Expr::value(
                    update.approval.status.role().map(|r| r.as_str().to_string()),
                ),
            )
            .col_expr(
                expenses::Column::CurrentApproverIndex,
                sea_orm::sea_query::Expr::value(index_to_db(update.approval.current_index)?),
            )
            .col_expr(
                expenses::Column::History,
                sea_orm::sea_query::Expr::value(to_json(&history)?),
            )
            .col_expr(
                expenses::Column::Version,
                sea_orm::sea_query::Expr::value(expected_version + 1),
            )
            .col_expr(
                expenses::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(update.updated_at),
            )
            .filter(expenses::Column::Id.eq(id.into_inner()))
            .filter(expenses::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            tracing::debug!(expense_id = %id, expected_version, "Compare-and-swap lost");
            return Err(RepositoryError::VersionConflict {
                id,
                expected: expected_version,
            });
        }

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }
}

fn db_error(err: DbErr) -> RepositoryError {
    RepositoryError::Database(err.to_string())
}

fn corrupt(id: uuid::Uuid, what: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Database(format!("corrupt expense row {id}: {what}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value).map_err(|e| RepositoryError::Database(e.to_string()))
}

fn index_to_db(index: Option<usize>) -> Result<Option<i32>, RepositoryError> {
    index
        .map(i32::try_from)
        .transpose()
        .map_err(|e| RepositoryError::Database(format!("approval level out of range: {e}")))
}

fn parse_history(model: &expenses::Model) -> Result<Vec<ApprovalAction>, RepositoryError> {
    serde_json::from_value(model.history.clone()).map_err(|e| corrupt(model.id, e))
}

/// Builds an insertable row from a domain expense.
pub(crate) fn expense_to_active(expense: &Expense) -> Result<expenses::ActiveModel, RepositoryError> {
    Ok(expenses::ActiveModel {
        id: Set(expense.id.into_inner()),
        submitter_id: Set(expense.submitter_id.into_inner()),
        submitter_name: Set(expense.submitter_name.clone()),
        category: Set(expense.category.clone()),
        description: Set(expense.description.clone()),
        amount: Set(expense.amount),
        currency: Set(expense.currency.as_str().to_string()),
        base_amount: Set(expense.base_amount),
        base_currency: Set(expense.base_currency.as_str().to_string()),
        conversion_rate: Set(expense.conversion_rate),
        rate_degraded: Set(expense.rate_degraded),
        expense_date: Set(expense.expense_date),
        approval_flow: Set(to_json(&expense.approval.flow)?),
        current_approver_index: Set(index_to_db(expense.approval.current_index)?),
        status: Set(expense.approval.status.as_str().to_string()),
        status_role: Set(expense.approval.status.role().map(|r| r.as_str().to_string())),
        history: Set(to_json(&expense.history)?),
        version: Set(expense.version),
        created_at: Set(expense.created_at.into()),
        updated_at: Set(expense.updated_at.into()),
    })
}

/// Rebuilds a domain expense from a row.
pub(crate) fn model_to_expense(model: expenses::Model) -> Result<Expense, RepositoryError> {
    let id = model.id;
    let flow: ApprovalFlow =
        serde_json::from_value(model.approval_flow.clone()).map_err(|e| corrupt(id, e))?;
    let history = parse_history(&model)?;
    let status = ExpenseStatus::from_parts(&model.status, model.status_role.as_deref())
        .map_err(|e| corrupt(id, e))?;
    let current_index = model
        .current_approver_index
        .map(usize::try_from)
        .transpose()
        .map_err(|e| corrupt(id, e))?;
    let currency = CurrencyCode::parse(&model.currency).map_err(|e| corrupt(id, e))?;
    let base_currency = CurrencyCode::parse(&model.base_currency).map_err(|e| corrupt(id, e))?;

    Ok(Expense {
        id: ExpenseId::from_uuid(id),
        submitter_id: UserId::from_uuid(model.submitter_id),
        submitter_name: model.submitter_name,
        category: model.category,
        description: model.description,
        amount: model.amount,
        currency,
        base_amount: model.base_amount,
        base_currency,
        conversion_rate: model.conversion_rate,
        rate_degraded: model.rate_degraded,
        expense_date: model.expense_date,
        approval: ApprovalState {
            flow,
            current_index,
            status,
        },
        history,
        version: model.version,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
