//! Client-side re-derivation of the top-performer ranking.
//!
//! Scores come from payroll inputs joined onto employee profiles; the live
//! `/v1/reports/top-performers` list is then diffed against that join.

use crate::domain::model::{EmployeeProfile, PayrollInput, ScoredEmployee, TopPerformerEntry};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Hire date used for ordering when a profile has none.
pub const MISSING_HIRE_DATE: &str = "9999-12-31";

/// 使用者 → 薪資數字：gross 優先，其次 net，再其次 amount，否則為 0
pub fn salary_map(inputs: &[PayrollInput]) -> HashMap<String, f64> {
    let mut salaries = HashMap::new();

    for input in inputs {
        let Some(user_id) = input.user_id.as_ref() else {
            continue;
        };

        let figure = match (input.gross, input.net) {
            (Some(gross), _) => gross,
            (None, Some(net)) => net,
            (None, None) => input.amount.unwrap_or(0.0),
        };

        // 同一使用者出現多次時以最後一筆為準
        salaries.insert(user_id.clone(), figure);
    }

    salaries
}

/// Joins payroll figures onto profiles; employees without payroll data score 0.
pub fn score_employees(profiles: &[EmployeeProfile], salaries: &HashMap<String, f64>) -> Vec<ScoredEmployee> {
    profiles
        .iter()
        .map(|profile| ScoredEmployee {
            id: profile.id.clone(),
            name: profile.name.clone(),
            department: profile.department.clone(),
            score: salaries.get(&profile.id).copied().unwrap_or(0.0),
            hire_date: profile.hire_date.clone(),
        })
        .collect()
}

/// Scores taken from the profile's own salary field (missing → 0).
pub fn score_by_profile_salary(profiles: &[EmployeeProfile]) -> Vec<ScoredEmployee> {
    profiles
        .iter()
        .map(|profile| ScoredEmployee {
            id: profile.id.clone(),
            name: profile.name.clone(),
            department: profile.department.clone(),
            score: profile.salary.unwrap_or(0.0),
            hire_date: profile.hire_date.clone(),
        })
        .collect()
}

/// 依分數遞減排序；同分時較早到職者在前，其餘維持原順序
pub fn rank(mut scored: Vec<ScoredEmployee>) -> Vec<ScoredEmployee> {
    scored.sort_by(compare_for_ranking);
    scored
}

fn compare_for_ranking(a: &ScoredEmployee, b: &ScoredEmployee) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| hire_date_key(a).cmp(hire_date_key(b)))
}

fn hire_date_key(employee: &ScoredEmployee) -> &str {
    employee.hire_date.as_deref().unwrap_or(MISSING_HIRE_DATE)
}

pub fn position_of(ranking: &[ScoredEmployee], id: &str) -> Option<usize> {
    ranking.iter().position(|e| e.id == id)
}

/// Diffs the live top-performers list against the expected ranking.
pub fn verify_top_performers(expected: &[ScoredEmployee], live: &[TopPerformerEntry], tolerance: f64) -> Result<()> {
    verify!(!live.is_empty(), "Top performers list is empty");

    for (index, pair) in live.windows(2).enumerate() {
        verify!(
            pair[1].score <= pair[0].score,
            "Top performers list is not sorted by score descending: position {} has {} but position {} has {}",
            index,
            pair[0].score,
            index + 1,
            pair[1].score
        );
    }

    let lookup: HashMap<&str, &ScoredEmployee> = expected.iter().map(|e| (e.id.as_str(), e)).collect();

    for (index, entry) in live.iter().enumerate() {
        let id = entry.id.as_deref().unwrap_or("<missing>");
        let Some(employee) = lookup.get(id) else {
            return Err(ProbeError::assertion(format!(
                "Top performer id {} not found in employee profiles",
                id
            )));
        };

        verify!(
            entry.name.as_deref() == Some(employee.name.as_str()),
            "Top performer name mismatch for id {}: expected {:?}, got {:?}",
            id,
            employee.name,
            entry.name
        );
        verify!(
            entry.department.as_deref() == Some(employee.department.as_str()),
            "Top performer department mismatch for id {}: expected {:?}, got {:?}",
            id,
            employee.department,
            entry.department
        );
        verify!(
            (entry.score - employee.score).abs() < tolerance,
            "Top performer score mismatch for id {}: expected {}, got {}",
            id,
            employee.score,
            entry.score
        );

        if let Some(expected_at_position) = expected.get(index) {
            verify!(
                (entry.score - expected_at_position.score).abs() < tolerance,
                "Top performer at position {} scores {} but the recomputed ranking has {} there",
                index,
                entry.score,
                expected_at_position.score
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, department: &str) -> EmployeeProfile {
        EmployeeProfile {
            id: id.to_string(),
            name: name.to_string(),
            department: department.to_string(),
            salary: None,
            hire_date: None,
        }
    }

    fn input(user_id: Option<&str>, gross: Option<f64>, net: Option<f64>, amount: Option<f64>) -> PayrollInput {
        PayrollInput {
            user_id: user_id.map(str::to_string),
            gross,
            net,
            amount,
        }
    }

    fn live(id: &str, name: &str, department: &str, score: f64) -> TopPerformerEntry {
        TopPerformerEntry {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            department: Some(department.to_string()),
            score,
        }
    }

    #[test]
    fn test_salary_map_field_precedence() {
        let salaries = salary_map(&[
            input(Some("a"), Some(5000.0), Some(4000.0), Some(1.0)),
            input(Some("b"), None, Some(3000.0), Some(1.0)),
            input(Some("c"), None, None, Some(2500.0)),
            input(Some("d"), None, None, None),
            input(Some("e"), Some(0.0), Some(900.0), None),
            input(None, Some(99999.0), None, None),
        ]);

        assert_eq!(salaries["a"], 5000.0);
        assert_eq!(salaries["b"], 3000.0);
        assert_eq!(salaries["c"], 2500.0);
        assert_eq!(salaries["d"], 0.0);
        // gross 為 0 仍然算「有值」
        assert_eq!(salaries["e"], 0.0);
        assert_eq!(salaries.len(), 5);
    }

    #[test]
    fn test_salary_map_last_entry_wins() {
        let salaries = salary_map(&[input(Some("a"), Some(100.0), None, None), input(Some("a"), Some(250.0), None, None)]);
        assert_eq!(salaries["a"], 250.0);
    }

    #[test]
    fn test_rank_orders_by_score_then_hire_date() {
        let mut employees = score_employees(
            &[profile("1", "Ana", "Ops"), profile("2", "Ben", "Eng"), profile("3", "Cy", "Eng"), profile("4", "Di", "HR")],
            &HashMap::from([
                ("1".to_string(), 3000.0),
                ("2".to_string(), 5000.0),
                ("3".to_string(), 5000.0),
            ]),
        );
        employees[1].hire_date = Some("2022-05-01".to_string());
        employees[2].hire_date = Some("2020-01-15".to_string());

        let ranked = rank(employees);
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1", "4"]);
        assert_eq!(ranked[3].score, 0.0);
    }

    #[test]
    fn test_rank_missing_hire_date_sorts_last_among_ties() {
        let mut a = profile("a", "A", "Eng");
        a.salary = Some(100.0);
        let mut b = profile("b", "B", "Eng");
        b.salary = Some(100.0);
        b.hire_date = Some("2024-02-02".to_string());
        let c = profile("c", "C", "Eng");

        let ranked = rank(score_by_profile_salary(&[a, b, c]));
        assert_eq!(position_of(&ranked, "b"), Some(0));
        assert_eq!(position_of(&ranked, "a"), Some(1));
        assert_eq!(position_of(&ranked, "c"), Some(2));
        assert_eq!(position_of(&ranked, "zzz"), None);
    }

    #[test]
    fn test_verify_top_performers_accepts_matching_list() {
        let expected = rank(score_employees(
            &[profile("1", "Ana", "Ops"), profile("2", "Ben", "Eng")],
            &HashMap::from([("1".to_string(), 3000.0), ("2".to_string(), 5000.0)]),
        ));
        let entries = vec![live("2", "Ben", "Eng", 5000.004), live("1", "Ana", "Ops", 3000.0)];
        assert!(verify_top_performers(&expected, &entries, 0.01).is_ok());
    }

    #[test]
    fn test_verify_top_performers_rejects_mismatches() {
        let expected = rank(score_employees(
            &[profile("1", "Ana", "Ops"), profile("2", "Ben", "Eng")],
            &HashMap::from([("1".to_string(), 3000.0), ("2".to_string(), 5000.0)]),
        ));

        let unsorted = vec![live("1", "Ana", "Ops", 3000.0), live("2", "Ben", "Eng", 5000.0)];
        assert!(verify_top_performers(&expected, &unsorted, 0.01)
            .unwrap_err()
            .to_string()
            .contains("not sorted"));

        let wrong_dept = vec![live("2", "Ben", "Sales", 5000.0)];
        assert!(verify_top_performers(&expected, &wrong_dept, 0.01)
            .unwrap_err()
            .to_string()
            .contains("department mismatch"));

        let unknown = vec![live("9", "Zed", "Eng", 5000.0)];
        assert!(verify_top_performers(&expected, &unknown, 0.01)
            .unwrap_err()
            .to_string()
            .contains("not found"));

        let off_score = vec![live("2", "Ben", "Eng", 5000.5)];
        assert!(verify_top_performers(&expected, &off_score, 0.01)
            .unwrap_err()
            .to_string()
            .contains("score mismatch"));

        assert!(verify_top_performers(&expected, &[], 0.01).is_err());
    }

    #[test]
    fn test_verify_top_performers_skipping_a_rank_fails() {
        let expected = rank(score_employees(
            &[profile("1", "Ana", "Ops"), profile("2", "Ben", "Eng"), profile("3", "Cy", "HR")],
            &HashMap::from([
                ("1".to_string(), 3000.0),
                ("2".to_string(), 5000.0),
                ("3".to_string(), 4000.0),
            ]),
        ));
        // Ben first, then Ana: Cy (4000) is missing from position 1
        let entries = vec![live("2", "Ben", "Eng", 5000.0), live("1", "Ana", "Ops", 3000.0)];
        let err = verify_top_performers(&expected, &entries, 0.01).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }
}
