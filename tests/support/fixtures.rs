//! Test fixtures and constants.

/// Minimal config for stack `demo`.
pub const CONFIG: &str = r#"
project = "demo"

[stack]
name = "demo"

[deploy]
with_secrets = true

[variables]
APP_ENV = "base"

[environments.staging]
stack = { name = "demo-staging" }
secrets = { stack_prefix = "stg" }
variables = { APP_ENV = "staging" }
"#;

/// Compose file with one built service and one secret.
pub const COMPOSE: &str = r#"
services:
  web:
    build: .
    image: registry.example/web
    secrets:
      - DB_PASSWORD
secrets:
  DB_PASSWORD:
    file: ./db.txt
networks:
  default:
    driver: overlay
"#;

/// Physical name of `DB_PASSWORD=abc123` in stack `demo`.
pub const DB_PASSWORD_NAME: &str = "demo_DB_PASSWORD_6ca13d52";

/// Stand-in for the docker CLI.
///
/// Logs every invocation to `docker.log`, serves `secret ls` from
/// `docker-secrets.jsonl` and reports an empty stack.
pub const FAKE_DOCKER: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/docker.log"
case "$1 $2" in
  "secret ls")
    cat "$dir/docker-secrets.jsonl"
    ;;
  "secret inspect")
    for last; do :; done
    if grep -q "\"Name\":\"$last\"" "$dir/docker-secrets.jsonl"; then
      echo "id-$last"
    else
      echo "Error: no such secret: $last" >&2
      exit 1
    fi
    ;;
  "login -u")
    cat > /dev/null
    ;;
  "secret create")
    cat > /dev/null
    echo "id-$3"
    ;;
  "stack deploy")
    echo "APP_ENV=$APP_ENV" >> "$dir/docker.log"
    ;;
  "stack services"|"stack ps")
    echo "Nothing found in stack: $3" >&2
    exit 1
    ;;
esac
exit 0
"#;
