//! Shared suite: every kernel must agree with the scalar scorer.

use std::collections::HashMap;

use oscarcast_core::{
    Candidate, Category, CategoryExperience, ExperienceConfig, NormalizedWeights, ScoreResult,
    Strength, score,
};

use crate::{ManagedKernel, ScoringKernel, score_with};

const TOLERANCE: f64 = 1e-12;

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: "best-picture".into(),
            name: "Best Picture".into(),
            nominees: 10,
            winner_base: 0.35,
            candidates: vec![
                Candidate::new("Oppenheimer", "Universal")
                    .with_features(95, 72, 88)
                    .with_strength(Strength::High),
                Candidate::new("Poor Things", "Searchlight").with_features(74, 60, 70),
                Candidate::new("Past Lives", "A24")
                    .with_features(52, 30, 66)
                    .with_strength(Strength::Low),
                Candidate::new("Maestro", "Netflix").with_features(0, 0, 0),
                Candidate::new("Outlier", "Nobody").with_features(100, 100, 100),
                Candidate::new("Misfiled", "Nobody").with_features(-500, 250, i32::MAX),
            ],
        },
        Category {
            id: "best-actor".into(),
            name: "Best Actor".into(),
            nominees: 5,
            winner_base: 0.55,
            candidates: vec![
                Candidate::new("Cillian Murphy", "Oppenheimer")
                    .with_features(90, 40, 80)
                    .with_strength(Strength::High),
                Candidate::new("Paul Giamatti", "The Holdovers").with_features(82, 55, 70),
                Candidate::new("Bradley Cooper", "Maestro").with_features(60, 65, 45),
                Candidate::new("Jeffrey Wright", "American Fiction").with_features(55, 35, 50),
                Candidate::new("Colman Domingo", "Rustin")
                    .with_features(50, 20, 40)
                    .with_strength(Strength::Low),
            ],
        },
        Category {
            id: "best-director".into(),
            name: "Best Director".into(),
            nominees: 5,
            winner_base: 0.45,
            candidates: vec![],
        },
    ]
}

fn experience() -> ExperienceConfig {
    let mut actor = CategoryExperience::default();
    actor.prior_wins.insert("Bradley Cooper".into(), 0);
    actor.prior_wins.insert("Paul Giamatti".into(), 2);
    actor.recent_winners.insert("Paul Giamatti".into(), 0.5);
    actor.overdue.push("Colman Domingo".into());
    let mut categories = HashMap::new();
    categories.insert("best-actor".to_string(), actor);
    ExperienceConfig { categories }
}

fn weight_sets() -> Vec<NormalizedWeights> {
    vec![
        NormalizedWeights::default(),
        NormalizedWeights::from_raw(1, 1, 1).unwrap(),
        NormalizedWeights::from_raw(100, 0, 0).unwrap(),
        NormalizedWeights::from_raw(3, 40, 57).unwrap(),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

fn assert_matches_scalar(kernel: &dyn ScoringKernel) {
    let exp = experience();
    for weights in weight_sets() {
        for cat in categories() {
            for experience in [None, Some(&exp)] {
                let got = score_with(kernel, &cat, &weights, experience).unwrap();
                let want: Vec<ScoreResult> = cat
                    .candidates
                    .iter()
                    .map(|c| score(&cat.id, c, &weights, experience))
                    .collect();
                assert_eq!(got.len(), want.len());
                for ((g, w), c) in got.iter().zip(&want).zip(&cat.candidates) {
                    let ctx = format!("{} / {} / {}", kernel.name(), cat.id, c.title);
                    assert!(close(g.nomination_raw, w.nomination_raw), "{ctx}: nomination");
                    assert!(close(g.winner_raw, w.winner_raw), "{ctx}: winner");
                    assert!(close(g.contributions.total(), w.contributions.total()), "{ctx}");
                    assert!(close(g.strength_multiplier, w.strength_multiplier), "{ctx}");
                    assert!(close(g.experience_multiplier, w.experience_multiplier), "{ctx}");
                }
            }
        }
    }
}

#[test]
fn managed_kernel_conforms() {
    assert_matches_scalar(&ManagedKernel);
}

#[cfg(feature = "columnar")]
#[test]
fn columnar_kernel_conforms() {
    let mut kernel = crate::ColumnarKernel::new();
    kernel.init().unwrap();
    assert!(kernel.is_ready());
    assert_matches_scalar(&kernel);
}

#[test]
fn experience_only_moves_individual_categories() {
    let exp = experience();
    let weights = NormalizedWeights::default();
    for cat in categories() {
        let plain = ManagedKernel.score_category(&cat, &weights, None).unwrap();
        let adjusted = ManagedKernel.score_category(&cat, &weights, Some(&exp)).unwrap();
        let moved = plain
            .iter()
            .zip(&adjusted)
            .any(|(a, b)| a.winner_raw != b.winner_raw);
        assert_eq!(moved, cat.id == "best-actor", "{}", cat.id);
    }
}
