use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer};
use tantivy::Index;

/// Tokenizer name registered for the language-analyzed fields.
pub const EN_STEM: &str = "en_stem";

/// Schema for the recipe search index
#[derive(Clone)]
pub struct RecipeSchema {
    pub schema: Schema,
    pub filename: Field,
    pub webpath: Field,
    pub html: Field,
    pub tags: Field,
    pub name: Field,
    pub body: Field,
}

impl RecipeSchema {
    pub fn new() -> Self {
        let mut schema_builder = Schema::builder();

        // Keyword fields: matched as a single untokenized term
        let filename = schema_builder.add_text_field("filename", STRING | STORED);
        let webpath = schema_builder.add_text_field("webpath", STRING | STORED);
        let html = schema_builder.add_text_field("html", STRING | STORED);
        let tags = schema_builder.add_text_field("tags", STRING | STORED);

        // Analyzed fields: English stemming, stored for highlighting
        let analyzed = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(EN_STEM)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();
        let name = schema_builder.add_text_field("name", analyzed.clone());
        let body = schema_builder.add_text_field("body", analyzed);

        let schema = schema_builder.build();

        Self {
            schema,
            filename,
            webpath,
            html,
            tags,
            name,
            body,
        }
    }

    /// Register the analyzers the schema refers to.
    pub fn register_tokenizers(&self, index: &Index) {
        let en_stem = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(40))
            .filter(LowerCaser)
            .filter(Stemmer::new(tantivy::tokenizer::Language::English))
            .build();
        index.tokenizers().register(EN_STEM, en_stem);
    }
}

impl Default for RecipeSchema {
    fn default() -> Self {
        Self::new()
    }
}
