use ndarray::Array2;
use proptest::prelude::*;
use topicflow::community::mcl::normalize;
use topicflow::scoring::f_measure;
use topicflow::{
    pairwise_scores, ClusterScorer, DocumentTermMatrix, MarkovClustering, PartOfSpeech,
    SoftSimilarity, StaticLexicon, TermSimilarity, Vocabulary,
};

const TERMS: [&str; 5] = ["rain", "storm", "cat", "dog", "sun"];

fn lexicon() -> StaticLexicon {
    StaticLexicon::new()
        .with_sense("entity.n.01", PartOfSpeech::Noun, None)
        .with_sense("weather.n.01", PartOfSpeech::Noun, Some("entity.n.01"))
        .with_sense("rain.n.01", PartOfSpeech::Noun, Some("weather.n.01"))
        .with_sense("storm.n.01", PartOfSpeech::Noun, Some("weather.n.01"))
        .with_sense("animal.n.01", PartOfSpeech::Noun, Some("entity.n.01"))
        .with_sense("cat.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
        .with_sense("dog.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
        .with_lemma("rain", &["rain.n.01"])
        .with_lemma("storm", &["storm.n.01"])
        .with_lemma("cat", &["cat.n.01"])
        .with_lemma("dog", &["dog.n.01"])
}

fn collection(rows: &[Vec<f64>]) -> DocumentTermMatrix {
    DocumentTermMatrix::from_rows(rows, Vocabulary::new(TERMS).unwrap()).unwrap()
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(0.0f64..3.0, TERMS.len()), 1..8)
}

proptest! {
    #[test]
    fn prop_similarity_matrix_is_symmetric_with_unit_diagonal(rows in rows_strategy()) {
        let m = collection(&rows);
        let sim = SoftSimilarity::new(lexicon()).similarity_matrix(&m).unwrap();
        let n = rows.len();
        prop_assert_eq!(sim.dim(), (n, n));
        for i in 0..n {
            prop_assert_eq!(sim[[i, i]], 1.0);
            for j in 0..n {
                prop_assert_eq!(sim[[i, j]], sim[[j, i]]);
                prop_assert!((0.0..=1.0).contains(&sim[[i, j]]));
            }
        }
    }

    #[test]
    fn prop_each_pair_evaluated_once(rows in rows_strategy()) {
        let m = collection(&rows);
        let kernel = SoftSimilarity::new(lexicon()).kernel(m.vocabulary()).unwrap();
        let scores = pairwise_scores(&kernel, m.vectors()).unwrap();
        let n = rows.len();
        prop_assert_eq!(scores.evaluations, n * (n - 1) / 2);
    }

    #[test]
    fn prop_nonzero_document_is_self_similar(row in prop::collection::vec(0.0f64..3.0, TERMS.len())) {
        prop_assume!(row.iter().any(|&w| w > 1e-6));
        let m = collection(std::slice::from_ref(&row));
        let mut engine = SoftSimilarity::new(lexicon());
        let d = m.document(0);
        let s = engine.similarity(d, d, m.vocabulary()).unwrap();
        prop_assert!((s - 1.0).abs() < 1e-9, "self similarity {}", s);
    }

    #[test]
    fn prop_term_self_score_is_one(term in "[a-z#]{1,8}") {
        let mut terms = TermSimilarity::new(lexicon());
        prop_assert_eq!(terms.score(&term, &term), 1.0);
    }

    #[test]
    fn prop_normalized_columns_are_stochastic(
        values in prop::collection::vec(0.0f64..5.0, 1..50)
    ) {
        let n = (values.len() as f64).sqrt() as usize;
        let mut m = Array2::from_shape_vec((n, n), values[..n * n].to_vec()).unwrap();
        normalize(&mut m);
        for col in m.columns() {
            let sum = col.sum();
            if sum != 0.0 {
                prop_assert!((sum - 1.0).abs() < 1e-9, "column sum {}", sum);
            }
        }
    }

    #[test]
    fn prop_mcl_respects_iteration_cap(
        values in prop::collection::vec(0.0f64..1.0, 1..37),
        max_iter in 1usize..12
    ) {
        let n = (values.len() as f64).sqrt() as usize;
        let mut m = Array2::from_shape_vec((n, n), values[..n * n].to_vec()).unwrap();
        let sym = &m + &m.t();
        m.assign(&sym);
        let out = MarkovClustering::new().with_max_iter(max_iter).fit(&m).unwrap();
        prop_assert!(out.iterations <= max_iter);
        for cluster in &out.clusters {
            prop_assert!(cluster.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(cluster.iter().all(|&i| i < n));
        }
    }

    #[test]
    fn prop_score_grows_with_event_size(
        r in 0.0f64..1.0,
        e1 in 0.0f64..1.0,
        e2 in 0.0f64..1.0
    ) {
        let (lo, hi) = if e1 <= e2 { (e1, e2) } else { (e2, e1) };
        prop_assert!(f_measure(r, lo) <= f_measure(r, hi) + 1e-12);
        prop_assert!(f_measure(lo, r) <= f_measure(hi, r) + 1e-12);
    }

    #[test]
    fn prop_kept_scores_meet_threshold(
        rows in rows_strategy(),
        threshold in 0.0f64..1.0
    ) {
        let m = collection(&rows);
        let mut engine = SoftSimilarity::new(lexicon());
        let kernel = engine.kernel(m.vocabulary()).unwrap();
        let sim = engine.similarity_matrix(&m).unwrap();
        let out = MarkovClustering::new().fit(&sim).unwrap();
        let kept = ClusterScorer::new()
            .with_threshold(threshold)
            .score(&kernel, m.vectors(), &out.clusters)
            .unwrap();
        for s in &kept {
            prop_assert!(s.score >= threshold);
        }
    }
}
