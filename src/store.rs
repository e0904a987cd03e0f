//! In-memory credential and data store.
//!
//! Keyed tables for users, organizations, memberships, employees, and weekly
//! scores, with monotonic id counters. `Store` is the plain table struct;
//! `SharedStore` is the `Arc`'d handle injected into request handlers. Every
//! public operation takes the lock once for the duration of the call, so each
//! call is atomic on its own (the autocommit-per-call model); account
//! deletion is the one path that groups several deletes under a single
//! acquisition.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::identity::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub primary_organization_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub user_id: i64,
    pub organization_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub role: String,
    pub organization_id: String,
}

/// Partial update: absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScore {
    pub id: i64,
    pub employee_id: i64,
    pub week: String,
    pub task_completion: f64,
    pub speed: f64,
    pub professionalism: f64,
    pub activity: f64,
    pub productivity_score: f64,
    pub organization_id: String,
}

#[derive(Default)]
pub struct Store {
    users: BTreeMap<i64, UserRecord>,
    organizations: HashMap<String, Organization>,
    memberships: BTreeMap<i64, Membership>,
    employees: BTreeMap<i64, Employee>,
    scores: BTreeMap<i64, WeeklyScore>,
    next_user_id: i64,
    next_membership_id: i64,
    next_employee_id: i64,
    next_score_id: i64,
}

/// Shared handle used by handlers and tests.
#[derive(Clone)]
pub struct SharedStore(Arc<RwLock<Store>>);

impl Default for SharedStore {
    fn default() -> Self { Self::new() }
}

impl SharedStore {
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(Store::default())))
    }

    // ---- users ----

    /// Create a user. Duplicate username OR email is a conflict; nothing is
    /// inserted in that case.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        primary_organization_id: &str,
    ) -> AppResult<UserRecord> {
        let mut s = self.0.write();
        if s.users.values().any(|u| u.username == username || u.email == email) {
            return Err(AppError::conflict("duplicate_user", "username or email already exists"));
        }
        s.next_user_id += 1;
        let user = UserRecord {
            id: s.next_user_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            primary_organization_id: primary_organization_id.to_string(),
            created_at: Utc::now(),
        };
        s.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: i64) -> Option<UserRecord> {
        self.0.read().users.get(&id).cloned()
    }

    pub fn user_by_username(&self, username: &str) -> Option<UserRecord> {
        self.0.read().users.values().find(|u| u.username == username).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<UserRecord> {
        self.0.read().users.values().find(|u| u.email == email).cloned()
    }

    /// Users holding a membership in the given organization.
    pub fn users_in_organization(&self, organization_id: &str) -> Vec<(UserRecord, Role)> {
        let s = self.0.read();
        s.memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .filter_map(|m| s.users.get(&m.user_id).map(|u| (u.clone(), m.role)))
            .collect()
    }

    /// Remove a user and their memberships. The user's owned organizations
    /// are left alone here; full teardown goes through `delete_account`.
    pub fn delete_user(&self, id: i64) -> AppResult<()> {
        let mut s = self.0.write();
        if s.users.remove(&id).is_none() {
            return Err(AppError::not_found("user_not_found", "team member not found"));
        }
        s.memberships.retain(|_, m| m.user_id != id);
        Ok(())
    }

    /// Grouped cascade for account deletion: the user, their memberships,
    /// every organization they own, and those organizations' employees,
    /// scores, and memberships, all under one lock acquisition.
    pub fn delete_account(&self, user_id: i64) -> AppResult<()> {
        let mut s = self.0.write();
        if s.users.remove(&user_id).is_none() {
            return Err(AppError::not_found("user_not_found", "user not found"));
        }
        let owned: Vec<String> = s
            .organizations
            .values()
            .filter(|o| o.owner_id == user_id)
            .map(|o| o.id.clone())
            .collect();
        for org_id in &owned {
            s.organizations.remove(org_id);
            s.employees.retain(|_, e| e.organization_id != *org_id);
            s.scores.retain(|_, sc| sc.organization_id != *org_id);
            s.memberships.retain(|_, m| m.organization_id != *org_id);
        }
        s.memberships.retain(|_, m| m.user_id != user_id);
        Ok(())
    }

    // ---- organizations ----

    pub fn create_organization(&self, id: &str, name: &str, owner_id: i64) -> Organization {
        let mut s = self.0.write();
        let org = Organization {
            id: id.to_string(),
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        s.organizations.insert(org.id.clone(), org.clone());
        org
    }

    pub fn organization(&self, id: &str) -> Option<Organization> {
        self.0.read().organizations.get(id).cloned()
    }

    // ---- memberships ----

    /// At most one membership per (user, organization) pair.
    pub fn add_membership(&self, user_id: i64, organization_id: &str, role: Role) -> AppResult<Membership> {
        let mut s = self.0.write();
        if s.memberships
            .values()
            .any(|m| m.user_id == user_id && m.organization_id == organization_id)
        {
            return Err(AppError::conflict("duplicate_membership", "user is already a member of this organization"));
        }
        s.next_membership_id += 1;
        let m = Membership {
            id: s.next_membership_id,
            user_id,
            organization_id: organization_id.to_string(),
            role,
            joined_at: Utc::now(),
        };
        s.memberships.insert(m.id, m.clone());
        Ok(m)
    }

    pub fn membership(&self, user_id: i64, organization_id: &str) -> Option<Membership> {
        self.0
            .read()
            .memberships
            .values()
            .find(|m| m.user_id == user_id && m.organization_id == organization_id)
            .cloned()
    }

    pub fn memberships_for_user(&self, user_id: i64) -> Vec<Membership> {
        self.0
            .read()
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    // ---- employees (tenant-scoped) ----

    pub fn employees(&self, organization_id: &str) -> Vec<Employee> {
        self.0
            .read()
            .employees
            .values()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect()
    }

    /// Ids outside the caller's organization present as absent.
    pub fn employee(&self, organization_id: &str, id: i64) -> AppResult<Employee> {
        self.0
            .read()
            .employees
            .get(&id)
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("employee_not_found", "employee not found"))
    }

    pub fn create_employee(&self, organization_id: &str, name: &str, department: &str, role: &str) -> Employee {
        let mut s = self.0.write();
        s.next_employee_id += 1;
        let e = Employee {
            id: s.next_employee_id,
            name: name.to_string(),
            department: department.to_string(),
            role: role.to_string(),
            organization_id: organization_id.to_string(),
        };
        s.employees.insert(e.id, e.clone());
        e
    }

    pub fn update_employee(&self, organization_id: &str, id: i64, update: EmployeeUpdate) -> AppResult<Employee> {
        let mut s = self.0.write();
        let e = s
            .employees
            .get_mut(&id)
            .filter(|e| e.organization_id == organization_id)
            .ok_or_else(|| AppError::not_found("employee_not_found", "employee not found"))?;
        if let Some(name) = update.name { e.name = name; }
        if let Some(department) = update.department { e.department = department; }
        if let Some(role) = update.role { e.role = role; }
        Ok(e.clone())
    }

    /// Delete an employee and cascade their score rows.
    pub fn delete_employee(&self, organization_id: &str, id: i64) -> AppResult<()> {
        let mut s = self.0.write();
        let exists = s
            .employees
            .get(&id)
            .map(|e| e.organization_id == organization_id)
            .unwrap_or(false);
        if !exists {
            return Err(AppError::not_found("employee_not_found", "employee not found"));
        }
        s.employees.remove(&id);
        s.scores.retain(|_, sc| sc.employee_id != id);
        Ok(())
    }

    // ---- weekly scores (tenant-scoped) ----

    /// (employee, week) uniqueness is not enforced; duplicates accumulate.
    #[allow(clippy::too_many_arguments)]
    pub fn add_score(
        &self,
        organization_id: &str,
        employee_id: i64,
        week: &str,
        task_completion: f64,
        speed: f64,
        professionalism: f64,
        activity: f64,
        productivity_score: f64,
    ) -> WeeklyScore {
        let mut s = self.0.write();
        s.next_score_id += 1;
        let score = WeeklyScore {
            id: s.next_score_id,
            employee_id,
            week: week.to_string(),
            task_completion,
            speed,
            professionalism,
            activity,
            productivity_score,
            organization_id: organization_id.to_string(),
        };
        s.scores.insert(score.id, score.clone());
        score
    }

    pub fn scores(&self, organization_id: &str) -> Vec<WeeklyScore> {
        self.0
            .read()
            .scores
            .values()
            .filter(|sc| sc.organization_id == organization_id)
            .cloned()
            .collect()
    }

    pub fn scores_for_week(&self, organization_id: &str, week: &str) -> Vec<WeeklyScore> {
        self.0
            .read()
            .scores
            .values()
            .filter(|sc| sc.organization_id == organization_id && sc.week == week)
            .cloned()
            .collect()
    }

    pub fn delete_score(&self, organization_id: &str, id: i64) -> AppResult<()> {
        let mut s = self.0.write();
        let exists = s
            .scores
            .get(&id)
            .map(|sc| sc.organization_id == organization_id)
            .unwrap_or(false);
        if !exists {
            return Err(AppError::not_found("score_not_found", "score not found"));
        }
        s.scores.remove(&id);
        Ok(())
    }
}
