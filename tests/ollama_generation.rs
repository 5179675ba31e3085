use mockito::Matcher;
use serde_json::json;
use swe_chatbot::llm::generation::ollama::DEFAULT_OLLAMA_MODEL;
use swe_chatbot::llm::generation::{ new_client, GenerationError };
use swe_chatbot::llm::{ GenerationRequest, LlmConfig, LlmType, SamplingParams };

fn ollama_config(base_url: String) -> LlmConfig {
    LlmConfig {
        llm_type: LlmType::Ollama,
        base_url: Some(base_url),
        completion_model: Some("gpt2".into()),
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn generate_sends_raw_prompt_with_sampling_options() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(
            Matcher::PartialJson(
                json!({
                "model": "gpt2",
                "prompt": "Question: hi\nAnswer:",
                "raw": true,
                "stream": false,
                "options": {
                    "num_predict": 120,
                    "temperature": 0.5,
                    "top_p": 0.9,
                    "repeat_penalty": 1.15
                }
            })
            )
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"gpt2","response":" Hello there.","done":true}"#)
        .create_async().await;

    let generator = new_client(&ollama_config(server.url())).unwrap();
    let request = GenerationRequest::new("Question: hi\nAnswer:", SamplingParams::default());
    let text = generator.generate(&request).await.unwrap();

    assert_eq!(text, "Question: hi\nAnswer: Hello there.");
    mock.assert_async().await;
}

#[tokio::test]
async fn load_warms_model_with_empty_prompt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({ "model": "gpt2", "prompt": "" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"gpt2","response":"","done":true}"#)
        .create_async().await;

    let generator = new_client(&ollama_config(server.url())).unwrap();
    generator.load().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn http_error_status_is_reported_with_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error":"model 'gpt2' not found"}"#)
        .create_async().await;

    let generator = new_client(&ollama_config(server.url())).unwrap();
    let request = GenerationRequest::new("Question: hi\nAnswer:", SamplingParams::default());
    let err = generator.generate(&request).await.unwrap_err();

    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("not found"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn unset_model_falls_back_to_ollama_library_default() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({ "model": "qwen2.5:0.5b", "prompt": "" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"qwen2.5:0.5b","response":"","done":true}"#)
        .create_async().await;

    let config = LlmConfig {
        completion_model: None,
        ..ollama_config(server.url())
    };
    let generator = new_client(&config).unwrap();
    assert_eq!(generator.get_model(), DEFAULT_OLLAMA_MODEL);
    generator.load().await.unwrap();

    mock.assert_async().await;
}
