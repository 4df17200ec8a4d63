mod module_tests;
