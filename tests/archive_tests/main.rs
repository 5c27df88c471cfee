//! Tests for the archive module

mod codec_tests;
