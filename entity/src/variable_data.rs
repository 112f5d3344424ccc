use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "variable_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub variable_scope_id: i32,
    /// JSON text of the value.
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub created_by: i32,
    pub created_on: NaiveDateTime,
    pub updated_by: i32,
    pub updated_on: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::variable_scope::Entity",
        from = "Column::VariableScopeId",
        to = "super::variable_scope::Column::Id"
    )]
    VariableScope,
}

impl ActiveModelBehavior for ActiveModel {}
