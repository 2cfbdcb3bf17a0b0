use onoma_core::model::builder::TrieBuilder;
use onoma_core::model::codec;
use onoma_core::model::expression::{Tokenization, read_corpus};
use onoma_core::model::sampler::Sampler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Corpus of weighted "<weight> <name>" lines; rejected lines are
    // counted by the source and reported below.
    let corpus = std::env::args().nth(1).unwrap_or_else(|| "./data/villages.txt".to_owned());
    let (expressions, rejected) = read_corpus(&corpus, Tokenization::Characters)?;
    println!("Parsed {} expressions ({} rejected)", expressions.len(), rejected);

    // Train a letter model with a look-back of 2 characters.
    let mut builder = TrieBuilder::new(2);
    for expression in expressions {
        builder.add(expression);
    }
    let trie = builder.build();
    println!("Model richness: {} bifurcations", trie.bifurcations());

    // Persist as text, then reload. The reload parses the text file once
    // and drops a .bin cache next to it for fast loading afterward.
    let model_path = "./data/villages.occ";
    let written = codec::save_model(&trie, model_path)?;
    println!("Saved {} entries to {}", written, model_path);

    let trie = codec::load_model(model_path)?;

    // Generate 10 new names.
    let mut sampler = Sampler::new(&trie, rand::rng());
    for (i, name) in sampler.sample_many(10)?.iter().enumerate() {
        println!("Generated name {}: {}", i + 1, name);
    }

    Ok(())
}
