pub mod naming_tests;
