table! {
    foods (id) {
        id -> Int4,
        name -> Varchar,
        serving_size -> Double,
        serving_size_units -> Varchar,
        calories -> Double,
        carbs -> Double,
        protein -> Double,
        fat -> Double,
        salt -> Double,
        sugar -> Double,
    }
}
