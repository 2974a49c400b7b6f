mod article_tests;
mod common;
