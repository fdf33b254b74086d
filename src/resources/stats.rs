//! Dashboard counters

use serde::Serialize;
use std::collections::BTreeMap;

use super::orders::{OrderStatus, Orders};
use super::products::Products;
use super::projects::{ProjectStatus, Projects};
use super::transactions::Transactions;
use super::users::Users;
use super::Resource;
use crate::constants::ADMIN_USERS_COLLECTION;
use crate::error::Result;
use crate::storage::traits::Filter;
use crate::storage::SharedDocumentStore;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_projects: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_transactions: u64,
    pub total_admins: u64,
    pub projects_by_status: BTreeMap<&'static str, u64>,
    pub orders_by_status: BTreeMap<&'static str, u64>,
}

pub async fn collect_stats(store: &SharedDocumentStore) -> Result<DashboardStats> {
    let all = Filter::new();

    let mut projects_by_status = BTreeMap::new();
    for status in ProjectStatus::ALL {
        let filter = Filter::new().eq("status", status.as_str());
        projects_by_status.insert(status.as_str(), store.count(Projects::COLLECTION, &filter).await?);
    }

    let mut orders_by_status = BTreeMap::new();
    for status in OrderStatus::ALL {
        let filter = Filter::new().eq("status", status.as_str());
        orders_by_status.insert(status.as_str(), store.count(Orders::COLLECTION, &filter).await?);
    }

    Ok(DashboardStats {
        total_users: store.count(Users::COLLECTION, &all).await?,
        total_projects: store.count(Projects::COLLECTION, &all).await?,
        total_products: store.count(Products::COLLECTION, &all).await?,
        total_orders: store.count(Orders::COLLECTION, &all).await?,
        total_transactions: store.count(Transactions::COLLECTION, &all).await?,
        total_admins: store.count(ADMIN_USERS_COLLECTION, &all).await?,
        projects_by_status,
        orders_by_status,
    })
}
