/*
    Test suite for the counter subsystem

    Covers:
    - Merge algebra (commutativity, associativity, idempotence)
    - Replica convergence through push, pull and reconciliation
    - Conservation of increments across replicas
    - Partial-failure tolerance
*/

pub mod convergence_tests;
