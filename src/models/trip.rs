use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub name: String,
    pub members: Vec<String>,
    pub expenses: Vec<Expense>,
    pub total_expense: f64,
}

impl Trip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            expenses: Vec::new(),
            total_expense: 0.0,
        }
    }

    pub fn has_member(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    /// Member names in first-appearance order, duplicates removed.
    pub fn distinct_members(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if !seen.contains(&member.as_str()) {
                seen.push(member);
            }
        }
        seen
    }

    /// Sum of every expense paid by `member`.
    pub fn paid_by(&self, member: &str) -> f64 {
        self.expenses
            .iter()
            .filter(|expense| expense.member == member)
            .map(|expense| expense.amount)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub member: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAmount {
    pub member: String,
    pub amount: f64,
}

impl MemberAmount {
    pub fn new(member: impl Into<String>, amount: f64) -> Self {
        Self {
            member: member.into(),
            amount,
        }
    }
}
