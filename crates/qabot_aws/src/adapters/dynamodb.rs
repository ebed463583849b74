use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use qabot_core::record::{AnswerRecord, ITEM_ID_ATTRIBUTE};
use qabot_core::results::ResultStore;
use tokio::runtime::Handle;

pub type Item = HashMap<String, AttributeValue>;

pub struct DynamoResultStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
    runtime: Handle,
}

impl DynamoResultStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: &str, runtime: Handle) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            runtime,
        }
    }
}

pub fn record_to_item(record: &AnswerRecord) -> Item {
    let fields = [
        (ITEM_ID_ATTRIBUTE, &record.item_id),
        ("context", &record.context),
        ("question", &record.question),
        ("answer", &record.answer),
        ("score", &record.score),
    ];
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), AttributeValue::S(value.clone())))
        .collect()
}

pub fn item_to_record(item: &Item) -> Result<AnswerRecord, String> {
    Ok(AnswerRecord {
        item_id: string_attribute(item, ITEM_ID_ATTRIBUTE)?,
        context: string_attribute(item, "context")?,
        question: string_attribute(item, "question")?,
        answer: string_attribute(item, "answer")?,
        score: string_attribute(item, "score")?,
    })
}

/// Reads a string attribute; numeric attributes are accepted as their literal.
fn string_attribute(item: &Item, name: &str) -> Result<String, String> {
    match item.get(name) {
        Some(AttributeValue::S(value)) | Some(AttributeValue::N(value)) => Ok(value.clone()),
        Some(_) => Err(format!("attribute '{name}' is not a string")),
        None => Err(format!("record is missing attribute '{name}'")),
    }
}

fn key(item_id: &str) -> (String, AttributeValue) {
    (
        ITEM_ID_ATTRIBUTE.to_string(),
        AttributeValue::S(item_id.to_string()),
    )
}

impl ResultStore for DynamoResultStore {
    fn get_item(&self, item_id: &str) -> Result<Option<AnswerRecord>, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let (key_name, key_value) = key(item_id);

        self.runtime.block_on(async move {
            let output = client
                .get_item()
                .table_name(table_name)
                .key(key_name, key_value)
                .send()
                .await
                .map_err(|error| format!("failed to get item: {}", DisplayErrorContext(&error)))?;
            output.item().map(item_to_record).transpose()
        })
    }

    fn put_item(&self, record: &AnswerRecord) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let item = record_to_item(record);

        self.runtime.block_on(async move {
            client
                .put_item()
                .table_name(table_name)
                .set_item(Some(item))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to put item: {}", DisplayErrorContext(&error)))
        })
    }

    fn delete_item(&self, item_id: &str) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let (key_name, key_value) = key(item_id);

        self.runtime.block_on(async move {
            client
                .delete_item()
                .table_name(table_name)
                .key(key_name, key_value)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete item: {}", DisplayErrorContext(&error)))
        })
    }

    fn scan(&self, limit: usize) -> Result<Vec<AnswerRecord>, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        self.runtime.block_on(async move {
            let output = client
                .scan()
                .table_name(table_name)
                .limit(limit)
                .send()
                .await
                .map_err(|error| {
                    format!("failed to scan table: {}", DisplayErrorContext(&error))
                })?;
            output
                .items()
                .iter()
                .map(item_to_record)
                .collect::<Result<Vec<_>, String>>()
        })
    }

    fn scan_item_ids(&self) -> Result<Vec<String>, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();

        self.runtime.block_on(async move {
            let mut items = client
                .scan()
                .table_name(table_name)
                .projection_expression("#id")
                .expression_attribute_names("#id", ITEM_ID_ATTRIBUTE)
                .into_paginator()
                .items()
                .send();

            let mut item_ids = Vec::new();
            while let Some(item) = items.next().await {
                let item = item.map_err(|error| {
                    format!("failed to scan table: {}", DisplayErrorContext(&error))
                })?;
                item_ids.push(string_attribute(&item, ITEM_ID_ATTRIBUTE)?);
            }
            Ok::<_, String>(item_ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AnswerRecord {
        AnswerRecord {
            item_id: "5f0c6a1e-0000-4000-8000-000000000000".to_string(),
            context: "Paris is the capital of France.".to_string(),
            question: "What is the capital of France?".to_string(),
            answer: "Paris".to_string(),
            score: "0.98".to_string(),
        }
    }

    #[test]
    fn item_uses_string_attributes_keyed_by_item_id() {
        let item = record_to_item(&sample_record());

        assert_eq!(item.len(), 5);
        assert_eq!(
            item.get("item_id"),
            Some(&AttributeValue::S(
                "5f0c6a1e-0000-4000-8000-000000000000".to_string()
            ))
        );
        assert_eq!(
            item.get("score"),
            Some(&AttributeValue::S("0.98".to_string()))
        );
        assert_eq!(item_to_record(&item), Ok(sample_record()));
    }

    #[test]
    fn numeric_score_is_read_as_literal() {
        let mut item = record_to_item(&sample_record());
        item.insert("score".to_string(), AttributeValue::N("0.975".to_string()));

        let record = item_to_record(&item).expect("numeric score accepted");
        assert_eq!(record.score, "0.975");
    }

    #[test]
    fn missing_answer_is_reported() {
        let mut item = record_to_item(&sample_record());
        item.remove("answer");

        let error = item_to_record(&item).expect_err("answer is required");
        assert_eq!(error, "record is missing attribute 'answer'");
    }

    #[test]
    fn non_string_attribute_is_rejected() {
        let mut item = record_to_item(&sample_record());
        item.insert("question".to_string(), AttributeValue::Bool(true));

        let error = item_to_record(&item).expect_err("question must be a string");
        assert!(error.contains("'question'"));
    }
}
