mod binding_tests;
