mod hint_tests;
mod index_tests;
mod layout_tests;
