//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
language: pt-BR
timezone: America/Sao_Paulo
date_format: DD MMM YYYY

# URL / Directory
root: /
public_dir: public

# Content backend (Prismic-style REST API)
cms:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  # access_token: ''
  document_type: posts
  page_size: 2
  # ref: ''
  timeout_secs: 30

# Seconds before a served page is regenerated in the background
revalidate:
  index: 300
  post: 180

reading:
  words_per_minute: 200

messages:
  load_more: Carregar mais posts
  loading: Carregando...
  load_error: Algo deu errado!
  not_found: Post não encontrado
"#;

/// Write a default `_config.yml` into `target_dir`
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;

    Ok(())
}
