use topicflow::{
    DetectorConfig, DocumentTermMatrix, PartOfSpeech, StaticLexicon, TopicDetector, Vocabulary,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows per-stage detail.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // A toy taxonomy: weather terms and animal terms under one root.
    let lexicon = StaticLexicon::new()
        .with_sense("entity.n.01", PartOfSpeech::Noun, None)
        .with_sense("weather.n.01", PartOfSpeech::Noun, Some("entity.n.01"))
        .with_sense("rain.n.01", PartOfSpeech::Noun, Some("weather.n.01"))
        .with_sense("storm.n.01", PartOfSpeech::Noun, Some("weather.n.01"))
        .with_sense("thunder.n.01", PartOfSpeech::Noun, Some("storm.n.01"))
        .with_sense("animal.n.01", PartOfSpeech::Noun, Some("entity.n.01"))
        .with_sense("cat.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
        .with_sense("dog.n.01", PartOfSpeech::Noun, Some("animal.n.01"))
        .with_sense("puppy.n.01", PartOfSpeech::Noun, Some("dog.n.01"))
        .with_lemma("rain", &["rain.n.01"])
        .with_lemma("storm", &["storm.n.01"])
        .with_lemma("thunder", &["thunder.n.01"])
        .with_lemma("cat", &["cat.n.01"])
        .with_lemma("dog", &["dog.n.01"])
        .with_lemma("puppy", &["puppy.n.01"]);

    let tweets: Vec<Vec<&str>> = vec![
        vec!["rain", "storm", "#weather"],
        vec!["thunder", "storm"],
        vec!["rain", "rain", "thunder"],
        vec!["cat", "dog"],
        vec!["puppy", "dog", "#pets"],
        vec!["cat", "puppy"],
    ];

    // Raw term counts as weights.
    let mut terms: Vec<&str> = tweets.iter().flatten().copied().collect();
    terms.sort_unstable();
    terms.dedup();
    let vocab = Vocabulary::new(terms.iter().copied())?;
    let entries = tweets.iter().enumerate().flat_map(|(doc, tokens)| {
        let vocab = &vocab;
        tokens
            .iter()
            .filter_map(move |t| vocab.index_of(t).map(|term| (doc, term, 1.0)))
    });
    let entries: Vec<(usize, usize, f64)> = entries.collect();
    let matrix = DocumentTermMatrix::from_triplets(tweets.len(), vocab, entries)?;

    let config = DetectorConfig {
        top_terms: 3,
        ..Default::default()
    };
    let mut detector = TopicDetector::with_config(lexicon, config);
    let topics = detector.detect(&matrix, &tweets)?;

    println!("{} topics from {} tweets", topics.len(), tweets.len());
    for (rank, topic) in topics.iter().enumerate() {
        let terms: Vec<String> = topic
            .top_terms
            .iter()
            .map(|(t, c)| format!("{t}({c})"))
            .collect();
        println!(
            "#{rank}: score={:.3} relatedness={:.3} size={:.3} members={:?} terms=[{}]",
            topic.score,
            topic.relatedness,
            topic.event_size,
            topic.members,
            terms.join(", ")
        );
    }

    let terms = detector.engine().terms();
    println!(
        "term cache: {} pairs, {} sense lookups",
        terms.cached_pairs(),
        terms.sense_lookups()
    );
    Ok(())
}
