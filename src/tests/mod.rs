mod collector_tests;
