//! Static catalog of read statements grouped by cost tier
//!
//! The table is closed and known at compile time: each entry pairs a
//! statement using positional `?` placeholders with a [`ParamRule`] that
//! produces the bound values for one execution.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost class of a read statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Point lookups on indexed columns
    #[serde(alias = "small")]
    Light,
    /// Joins and small aggregates
    Medium,
    /// Full-table multi-join reports
    #[serde(alias = "large")]
    Heavy,
}

impl Tier {
    /// All tiers in ascending cost order
    pub const ALL: [Tier; 3] = [Tier::Light, Tier::Medium, Tier::Heavy];

    /// Lowercase tier name
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Light => "light",
            Tier::Medium => "medium",
            Tier::Heavy => "heavy",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound statement parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    /// Integer parameter
    Int(i64),
    /// Text parameter
    Text(&'static str),
}

/// Rule producing the bound values for one execution
#[derive(Debug, Clone, Copy)]
pub enum ParamRule {
    /// Statement takes no parameters
    None,
    /// One integer drawn uniformly from an inclusive range
    IntRange(i64, i64),
    /// One string drawn uniformly from a fixed list
    OneOf(&'static [&'static str]),
    /// The same values on every execution
    Fixed(&'static [ParamValue]),
}

impl ParamRule {
    /// Produce concrete values for one execution
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<ParamValue> {
        match *self {
            ParamRule::None => Vec::new(),
            ParamRule::IntRange(low, high) => vec![ParamValue::Int(rng.gen_range(low..=high))],
            ParamRule::OneOf(choices) => choices
                .choose(rng)
                .map(|s| vec![ParamValue::Text(*s)])
                .unwrap_or_default(),
            ParamRule::Fixed(values) => values.to_vec(),
        }
    }

    /// Number of placeholders this rule fills
    pub fn arity(&self) -> usize {
        match *self {
            ParamRule::None => 0,
            ParamRule::IntRange(..) | ParamRule::OneOf(_) => 1,
            ParamRule::Fixed(values) => values.len(),
        }
    }
}

/// A parameterized read statement
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    /// Cost tier
    pub tier: Tier,
    /// Short identifier for log output
    pub name: &'static str,
    /// Statement text with `?` placeholders
    pub statement: &'static str,
    /// Parameter generator
    pub params: ParamRule,
}

const DEPARTMENT_NAMES: &[&str] = &["Engineering", "Sales", "Marketing", "Finance", "R&D"];

const SALARY_BAND: &[ParamValue] = &[ParamValue::Int(80_000), ParamValue::Int(150_000)];

/// Every statement the generator can issue
pub static CATALOG: &[QueryTemplate] = &[
    QueryTemplate {
        tier: Tier::Light,
        name: "department_by_id",
        statement: "SELECT * FROM departments WHERE dept_id = ?",
        params: ParamRule::IntRange(1, 10),
    },
    QueryTemplate {
        tier: Tier::Light,
        name: "employee_by_id",
        statement: "SELECT * FROM employees WHERE emp_id = ?",
        params: ParamRule::IntRange(1, 100),
    },
    QueryTemplate {
        tier: Tier::Light,
        name: "department_by_name",
        statement: "SELECT * FROM departments WHERE dept_name = ?",
        params: ParamRule::OneOf(DEPARTMENT_NAMES),
    },
    QueryTemplate {
        tier: Tier::Light,
        name: "department_headcount",
        statement: "SELECT COUNT(*) as cnt FROM employees WHERE dept_id = ?",
        params: ParamRule::IntRange(1, 10),
    },
    QueryTemplate {
        tier: Tier::Light,
        name: "project_status",
        statement: "SELECT project_name, status, budget FROM projects WHERE project_id = ?",
        params: ParamRule::IntRange(1, 20),
    },
    QueryTemplate {
        tier: Tier::Medium,
        name: "department_roster",
        statement: "SELECT e.emp_id, e.first_name, e.last_name, e.job_title, e.salary, d.dept_name \
                    FROM employees e \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    WHERE d.dept_id = ?",
        params: ParamRule::IntRange(1, 10),
    },
    QueryTemplate {
        tier: Tier::Medium,
        name: "salary_band",
        statement: "SELECT e.first_name, e.last_name, e.salary, d.dept_name \
                    FROM employees e \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    WHERE e.salary BETWEEN ? AND ? \
                    ORDER BY e.salary DESC",
        params: ParamRule::Fixed(SALARY_BAND),
    },
    QueryTemplate {
        tier: Tier::Medium,
        name: "department_summary",
        statement: "SELECT d.dept_name, COUNT(e.emp_id) as emp_count, \
                    AVG(e.salary) as avg_salary, MIN(e.salary) as min_salary, MAX(e.salary) as max_salary \
                    FROM departments d \
                    LEFT JOIN employees e ON d.dept_id = e.dept_id \
                    GROUP BY d.dept_id, d.dept_name",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Medium,
        name: "recent_hires",
        statement: "SELECT e.first_name, e.last_name, e.hire_date, e.job_title, d.dept_name \
                    FROM employees e \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    WHERE e.hire_date >= '2021-01-01' \
                    ORDER BY e.hire_date DESC \
                    LIMIT 30",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Medium,
        name: "active_projects",
        statement: "SELECT p.project_name, p.budget, p.status, d.dept_name, \
                    COUNT(pa.emp_id) as team_size \
                    FROM projects p \
                    JOIN departments d ON p.dept_id = d.dept_id \
                    LEFT JOIN project_assignments pa ON p.project_id = pa.project_id \
                    WHERE p.status = 'active' \
                    GROUP BY p.project_id, p.project_name, p.budget, p.status, d.dept_name",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Heavy,
        name: "employee_directory",
        statement: "SELECT e.emp_id, e.first_name, e.last_name, e.email, e.hire_date, \
                    e.job_title, e.salary, d.dept_name, d.location, \
                    m.first_name as manager_first, m.last_name as manager_last \
                    FROM employees e \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    LEFT JOIN employees m ON e.manager_id = m.emp_id \
                    ORDER BY d.dept_name, e.last_name",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Heavy,
        name: "project_teams",
        statement: "SELECT p.project_name, p.status, p.budget, \
                    e.first_name, e.last_name, e.job_title, \
                    pa.role, pa.hours_allocated, d.dept_name \
                    FROM project_assignments pa \
                    JOIN projects p ON pa.project_id = p.project_id \
                    JOIN employees e ON pa.emp_id = e.emp_id \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    ORDER BY p.project_name, pa.role",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Heavy,
        name: "salary_history",
        statement: "SELECT e.first_name, e.last_name, e.job_title, d.dept_name, \
                    sh.old_salary, sh.new_salary, sh.change_date, sh.change_reason, \
                    (sh.new_salary - sh.old_salary) as salary_increase \
                    FROM salary_history sh \
                    JOIN employees e ON sh.emp_id = e.emp_id \
                    JOIN departments d ON e.dept_id = d.dept_id \
                    ORDER BY sh.change_date DESC",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Heavy,
        name: "department_budgets",
        statement: "SELECT d.dept_name, d.budget as dept_budget, d.location, \
                    COUNT(DISTINCT e.emp_id) as emp_count, \
                    SUM(e.salary) as total_salaries, \
                    COUNT(DISTINCT p.project_id) as project_count, \
                    COALESCE(SUM(p.budget), 0) as total_project_budget \
                    FROM departments d \
                    LEFT JOIN employees e ON d.dept_id = e.dept_id \
                    LEFT JOIN projects p ON d.dept_id = p.dept_id \
                    GROUP BY d.dept_id, d.dept_name, d.budget, d.location \
                    ORDER BY d.dept_name",
        params: ParamRule::None,
    },
    QueryTemplate {
        tier: Tier::Heavy,
        name: "cross_department_projects",
        statement: "SELECT p.project_name, p.status, \
                    pd.dept_name as owning_dept, \
                    GROUP_CONCAT(DISTINCT ed.dept_name) as participating_depts, \
                    COUNT(DISTINCT pa.emp_id) as team_size, \
                    SUM(pa.hours_allocated) as total_hours \
                    FROM projects p \
                    JOIN departments pd ON p.dept_id = pd.dept_id \
                    JOIN project_assignments pa ON p.project_id = pa.project_id \
                    JOIN employees e ON pa.emp_id = e.emp_id \
                    JOIN departments ed ON e.dept_id = ed.dept_id \
                    GROUP BY p.project_id, p.project_name, p.status, pd.dept_name \
                    HAVING COUNT(DISTINCT ed.dept_id) > 1 \
                    ORDER BY team_size DESC",
        params: ParamRule::None,
    },
];

/// Templates belonging to one tier, in catalog order
pub fn templates_for(tier: Tier) -> Vec<&'static QueryTemplate> {
    CATALOG.iter().filter(|t| t.tier == tier).collect()
}
