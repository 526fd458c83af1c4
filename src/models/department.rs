//! Club departments and their leads.
//!
//! The roster changes once a year with the committee, so it ships with the
//! binary instead of living in the database.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentLead {
    pub name: &'static str,
    pub title: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub image: &'static str,
    pub leads: Vec<DepartmentLead>,
}

/// Response body of `GET /api/departments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentsResponse {
    pub departments_data: Vec<Department>,
}

fn technical(name: &'static str, leads: [(&'static str, &'static str); 3]) -> Department {
    Department {
        name,
        description: "",
        kind: "Technical",
        image: "",
        leads: leads
            .into_iter()
            .map(|(name, title)| DepartmentLead {
                name,
                title,
                image: "",
            })
            .collect(),
    }
}

/// The current department roster.
pub fn club_departments() -> Vec<Department> {
    vec![
        technical("Web", [("W1", "Web Lead"), ("W2", "Web SubLead"), ("W3", "Web SubLead")]),
        technical("AIML", [("A1", "AIML Lead"), ("A2", "AIML SubLead"), ("A3", "AIML SubLead")]),
        technical(
            "Robotics",
            [("R1", "Robotics Lead"), ("R2", "Robotics SubLead"), ("R3", "Robotics SubLead")],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_serializes_type_field() {
        let body = serde_json::to_value(DepartmentsResponse {
            departments_data: club_departments(),
        })
        .unwrap();
        let departments = body["departmentsData"].as_array().unwrap();
        assert_eq!(departments.len(), 3);
        assert_eq!(departments[0]["name"], "Web");
        assert_eq!(departments[0]["type"], "Technical");
        assert_eq!(departments[2]["leads"][0]["title"], "Robotics Lead");
    }
}
