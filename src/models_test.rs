use super::*;
use tempfile::TempDir;

#[test]
fn test_model_info() {
    let info = ModelId::WhisperBaseEn.info();
    assert_eq!(info.filename, "ggml-base.en.bin");
    assert!(info.url.contains("whisper.cpp"));
    assert!(info.size_bytes.is_some());
}

#[test]
fn test_model_manager_custom_dir() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());
    assert_eq!(manager.models_dir(), temp.path());
}

#[test]
fn test_speech_model_mapping() {
    assert_eq!(ModelId::from(SpeechModel::WhisperTiny), ModelId::WhisperTiny);
    assert_eq!(
        ModelId::from(SpeechModel::WhisperSmallEn),
        ModelId::WhisperSmallEn
    );
}

#[tokio::test]
async fn test_resolve_explicit_path_missing() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());

    let config = ModelConfig {
        model_path: Some(temp.path().join("no-such-model.bin")),
        ..Default::default()
    };

    let result = manager.resolve(&config, &|_, _| {}).await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("does not exist")
    );
}

#[tokio::test]
async fn test_resolve_explicit_path_exists() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());

    let model_file = temp.path().join("friday2-stt-ftwb.bin");
    tokio::fs::write(&model_file, b"ggml").await.unwrap();

    let config = ModelConfig {
        model_path: Some(model_file.clone()),
        ..Default::default()
    };

    let resolved = manager.resolve(&config, &|_, _| {}).await.unwrap();
    assert_eq!(resolved, model_file);
}

#[tokio::test]
async fn test_ensure_returns_existing_model_of_right_size() {
    let temp = TempDir::new().unwrap();
    let manager = ModelManager::with_dir(temp.path());

    // Pre-place a file with the expected size so no download is attempted
    let info = ModelId::WhisperTiny.info();
    let path = temp.path().join(info.filename);
    let data = vec![0u8; info.size_bytes.unwrap() as usize];
    tokio::fs::write(&path, &data).await.unwrap();

    let resolved = manager.ensure(ModelId::WhisperTiny, &|_, _| {}).await.unwrap();
    assert_eq!(resolved, path);
}
